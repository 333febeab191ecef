pub mod directory;
pub mod history;

/// 2016-12-01 00:00:00 UTC, first instant covered by the fixture day.
pub const DAY_START: i64 = 1_480_550_400;
/// Last instant covered by the fixture day.
pub const DAY_END: i64 = DAY_START + 86_400;
