mod api;
mod app;
mod application;
mod domain;
mod logging;
mod ui;

use api::{ApiClient, ApiConfig};

fn main() -> iced::Result {
    logging::init_logging();

    let api_client = match ApiClient::new(ApiConfig::default()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    iced::application(move || app::boot(api_client.clone()), app::update, app::view)
        .title("Asset Grabber")
        .run()
}
