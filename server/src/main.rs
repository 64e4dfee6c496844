use std::env;

use futures::StreamExt;
use schema::Speed;

use server::CsvRunner;

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let hospitals_path = env::var("HOSPITALS_CSV")
        .unwrap_or_else(|_| schema::SAMPLE_HOSPITALS_CSV_PATH.to_string());
    let orders_path =
        env::var("ORDERS_CSV").unwrap_or_else(|_| schema::SAMPLE_ORDERS_CSV_PATH.to_string());

    let mut runner = CsvRunner::from_csv_paths(&hospitals_path, &orders_path)?
        .with_speed(Speed::fast_forward(200).expect("speed")); // replay the day in fast-forward

    let hospitals = runner.hospitals().clone();
    let updates = runner.stream_updates().expect("update stream");

    // Monitor task: log where every airborne Zip is as the day plays out.
    let monitor = updates.for_each(|update| {
        for flight in &update.flights {
            let (east_m, north_m, aboard) =
                flight.position(&hospitals, update.time, schema::ZIP_SPEED_MPS);
            log::info!(
                "[{}] {} at ({east_m:.0} E, {north_m:.0} N), {aboard} packages aboard",
                update.time,
                flight.zip,
            );
        }

        futures::future::ready(())
    });

    let run = runner.run_with_defaults();
    // Close the runner's copy of the update channel so the monitor ends with
    // the day instead of waiting forever.
    drop(runner);

    let (unfulfilled, _) = futures::join!(run, monitor);
    log::info!("{} unfulfilled orders at the end of the day", unfulfilled?);

    Ok(())
}
