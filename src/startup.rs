use std::sync::Once;

static INIT: Once = Once::new();

/// 一次性初始化：日志
/// 在任何积分调用之前由 main 调用，重复调用无效果
pub fn init() {
    INIT.call_once(|| {
        // 默认 info 级别，可用 RUST_LOG 覆盖
        let result =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .format_timestamp_millis()
                .try_init();
        // 测试中 test-log 可能已经装好了 logger，沿用即可
        if let Err(e) = result {
            log::debug!("沿用已有的 logger: {}", e);
        }
    });
}
