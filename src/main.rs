use chargecheck::config::Config;
use chargecheck::{ChargeTransparencyRecord, ChargingSession, ConfigHolder, Registry, SessionAggregator};
use log::{error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::{env, fs};

/* a CTR is recognised by its JSON-LD context */
fn verify_file(aggregator: &SessionAggregator, path: &str) -> Result<Value, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&contents)?;

    if document.get("@context").is_some() {
        let ctr: ChargeTransparencyRecord = serde_json::from_value(document)?;
        return Ok(serde_json::to_value(aggregator.verify_ctr(&ctr))?);
    }
    let session: ChargingSession = serde_json::from_value(document)?;
    Ok(serde_json::to_value(aggregator.verify_charging_session(&session))?)
}

fn load_config() -> Config {
    match ConfigHolder::load() {
        Ok(holder) => holder.get_complete_config(),
        Err(e) => {
            warn!("{e}, starting with an empty key registry");
            Config::default()
        }
    }
}

#[cfg(feature = "api")]
fn serve(config: &Config) -> Result<(), Box<dyn Error>> {
    let api = chargecheck::ApiManager::new(config);
    actix_web::rt::System::new().block_on(api.start_thread())?;
    Ok(())
}

#[cfg(not(feature = "api"))]
fn serve(_config: &Config) -> Result<(), Box<dyn Error>> {
    Err("built without the api feature, pass the files to verify".into())
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    let default_filter = env::var("CC_LOG_LEVEL").unwrap_or("info".to_string());
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    let config = load_config();
    let files: Vec<String> = env::args().skip(1).collect();

    if files.is_empty() {
        return serve(&config);
    }

    let registry = Registry::from_config(&config);
    let aggregator = SessionAggregator::new(&registry);
    let mut failed = false;
    for path in &files {
        match verify_file(&aggregator, path) {
            Ok(result) => {
                info!("{path}: {}", result["status"]);
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            Err(e) => {
                error!("Unable to verify {path}: {e}");
                failed = true;
            }
        }
    }

    if failed {
        return Err("not all files could be verified".into());
    }
    Ok(())
}
