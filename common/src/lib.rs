pub mod log_setup;
pub mod test_utils;
pub mod timing;

pub fn is_debug() -> bool {
    cfg!(debug_assertions)
}
