use guestbook_service::api;
use guestbook_service::common::init;
use guestbook_service::settings::AppSettings;
use guestbook_service::workers::crons;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = AppSettings::get();
    init::initialize_logging(settings);
    match settings.app_component.as_str() {
        "api" => api::serve(settings).await,
        "cleanup-cron" => crons::cleanup_cron::serve(settings).await,
        component => anyhow::bail!("Unknown app component: {component}"),
    }
}
