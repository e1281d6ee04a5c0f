use std::io;
use std::process::ExitCode;

use tracing::{error, info};

use travel_brief::input::prompt_destination;
use travel_brief::{
    Credentials, Presenter, RunOutcome, TravelAssistant, TravelBriefConfig, TripBriefError,
    logging,
};

const EXIT_FAILURE: u8 = 1;
const EXIT_CONFIG: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match TravelBriefConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    if let Err(e) = logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e:#}");
        return ExitCode::from(EXIT_CONFIG);
    }

    let assistant = match Credentials::from_env()
        .and_then(|credentials| TravelAssistant::from_config(&config, &credentials))
    {
        Ok(assistant) => assistant,
        Err(e) => {
            error!("Startup failed: {e}");
            eprintln!("{}", e.user_message());
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let presenter = Presenter::from_config(&config.presenter);

    let city = match prompt_destination(&mut io::stdin().lock(), &mut io::stdout()) {
        Ok(city) => city,
        Err(e) => {
            presenter.record("", &RunOutcome::from_error(&e));
            report(&e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    match assistant.prepare_brief(&city).await {
        Ok(brief) => {
            if let Err(e) = presenter.present(&mut io::stdout().lock(), &brief) {
                error!("Failed to write brief: {e}");
                presenter.record(brief.city(), &RunOutcome::from_error(&e));
                return ExitCode::from(EXIT_FAILURE);
            }
            presenter.record(
                brief.city(),
                &RunOutcome::Delivered {
                    bytes: brief.markdown().len(),
                },
            );
            info!("Delivered brief for {}", brief.city());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Run for '{city}' ended: {e}");
            presenter.record(&city, &RunOutcome::from_error(&e));
            report(&e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

// refusals go to stdout
fn report(error: &TripBriefError) {
    if error.is_refusal() {
        println!("{}", error.user_message());
    } else {
        eprintln!("{}", error.user_message());
    }
}
