// src/main.rs
// 无界面运行：读取配置 -> 打开串口 -> 持续解析 -> 停止后导出 CSV
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{info, warn};

use serial_plotter::{
    ChartBounds, Sample, SampleSink, SerialPortOpener, SessionConfig, SessionController,
};

const PUMP_INTERVAL: Duration = Duration::from_millis(50);

// 每个新样本打印一行，相当于界面上的时间/信号标签
struct LogSink;

impl SampleSink for LogSink {
    fn on_update(&mut self, samples: &[Sample], bounds: Option<ChartBounds>) {
        let Some(latest) = samples.last() else {
            return;
        };
        let (time, signal) = latest.readout();
        match bounds {
            Some(b) => info!(
                "t={time}s signal={signal} (x 0..{:.1}, y {:.3}..{:.3})",
                b.x.1, b.y.0, b.y.1
            ),
            None => info!("t={time}s signal={signal}"),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    // 第一个参数是配置文件路径（可选）
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "serial_plotter.json".to_string());
    info!("📄 loading session config from {config_path}");
    let config = SessionConfig::load_from_file(&config_path)
        .with_context(|| format!("could not load {config_path}"))?;
    config.log_config();

    let mut session = SessionController::new(SerialPortOpener, config.record_format());
    session.set_clear_on_start(config.clear_on_start);
    session.set_sink(LogSink);
    session
        .start(config.port_settings())
        .context("could not start serial session")?;

    let deadline = config
        .duration_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        if let Err(e) = session.pump_timeout(PUMP_INTERVAL) {
            warn!("❌ {e}");
            break;
        }
    }
    session.stop();
    if session.dropped_records() > 0 {
        warn!("{} malformed records were dropped", session.dropped_records());
    }

    if let Some(path) = &config.export_path {
        session
            .export_csv(path)
            .with_context(|| format!("could not export to {}", path.display()))?;
    }
    Ok(())
}
