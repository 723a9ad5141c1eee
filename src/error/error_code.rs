// 查询错误
// 13xxx
pub const QUERY_EXECUTION_FAILED: u32 = 13001;
pub const STORE_UNAVAILABLE: u32 = 13002;
pub const QUERY_TIMEOUT: u32 = 13003;
pub const MEMORY_LIMIT_EXCEEDED: u32 = 13004;
pub const MALFORMED_ROW: u32 = 13005;
pub const PERMISSION_DENIED: u32 = 13006;

// request错误
// 20xxx
pub const INVALID_BODY: u32 = 20002;
pub const BODY_REJECTION: u32 = 20003;
