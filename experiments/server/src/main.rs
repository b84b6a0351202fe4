use {
    anyhow::{Context, Result},
    base::{Latest, Shutdown, log},
    com::Client,
    image::{Font, Overlay},
    sensor::{Dht22, ReadingLog, Sampler, SensorReading, dht22::IIO_DEVICES},
    server::{AppState, Config, Schedule, Uploader, router},
    tokio::{net::TcpListener, task::JoinHandle},
    video::{Capture, Frame},
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    match config.log_dir() {
        Some(dir) => base::init_file_logger(dir, config.log_level())?,
        None => base::init_stdout_logger(config.log_level()),
    }

    log::info!("picam: starting");

    let frames = Latest::<Frame>::new();
    let readings = Latest::<SensorReading>::new();
    let shutdown = Shutdown::new();
    let mut workers: Vec<JoinHandle<()>> = Vec::new();

    let reading_log = ReadingLog::new(config.reading_log());
    if let Err(error) = reading_log.rotate() {
        log::warn!("picam: cannot rotate {:?}: {error}", reading_log.path());
    }

    let capture = Capture::new(config.capture().clone());
    workers.push(tokio::spawn(capture.supervise(frames.clone(), shutdown.clone())));

    let dht = match config.sensor_dir() {
        Some(dir) => Ok(Dht22::new(dir)),
        None => Dht22::discover(IIO_DEVICES),
    };
    match dht {
        Ok(dht) => {
            log::info!("picam: sensor at {:?}", dht.dir());
            let sampler =
                Sampler::new(dht, readings.clone()).with_interval(config.sensor_interval());
            workers.push(sampler.spawn(shutdown.clone()));
        }
        Err(error) => log::warn!("picam: running without sensor: {error}"),
    }

    if config.upload_enabled() {
        let client = Client::new(config.upload().clone()).context("upload client")?;
        let font = Font::load_or_builtin(config.font_path(), config.font_size());
        let uploader = Uploader::new(client, frames.clone(), readings.clone(), Overlay::new(font))
            .with_schedule(Schedule::new(config.upload_delay(), config.upload_backoff()))
            .with_reading_log(reading_log);
        workers.push(tokio::spawn(uploader.run(shutdown.clone())));
    } else {
        log::warn!("picam: no upload token configured, uploads disabled");
    }

    let state = AppState::new(frames, readings)
        .with_stream_interval(config.stream_interval())
        .with_shutdown(shutdown.clone());
    let listener = TcpListener::bind(config.listen())
        .await
        .with_context(|| format!("binding {}", config.listen()))?;
    log::info!("picam: listening on {}", listener.local_addr()?);

    let stop = shutdown.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            if let Err(error) = tokio::signal::ctrl_c().await {
                log::error!("picam: cannot listen for ctrl-c: {error}");
                std::future::pending::<()>().await;
            }
            log::info!("picam: shutting down");
            stop.trigger();
        })
        .await?;

    shutdown.trigger();
    for worker in workers {
        if let Err(error) = worker.await {
            log::warn!("picam: worker failed: {error}");
        }
    }
    log::info!("picam: stopped");
    Ok(())
}
