use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::gateway;
use crate::guidance::types::{FieldKind, FieldQuery};
use anyhow::Result;
use std::sync::Arc;

async fn run_ask(
    config: Arc<Config>,
    label: String,
    field_type: FieldKind,
    options: Option<String>,
    form_context: Option<String>,
) -> Result<()> {
    let state = gateway::build_state(Arc::clone(&config)).await?;

    let mut query = FieldQuery::new(label, field_type);
    if let Some(options) = options {
        query = query.with_options(options);
    }
    if let Some(form_context) = form_context {
        query = query.with_form_context(form_context);
    }

    let outcome = state.broker.field_guidance(&query).await;
    state.broker.history().close().await;

    let result = outcome?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn run_history(config: Arc<Config>, limit: Option<usize>) -> Result<()> {
    let history = crate::history::create_history_store(&config).await?;
    let limit = config.history.clamp_limit(limit);
    let records = history.recent(limit).await;
    history.close().await;

    let records = records?;
    if records.is_empty() {
        println!("No interactions recorded yet.");
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    let config = Arc::new(config);

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.gateway.host.clone());
            let port = port.unwrap_or(config.gateway.port);
            gateway::run_gateway(&host, port, config).await
        }
        Commands::Ask {
            label,
            field_type,
            options,
            form_context,
        } => run_ask(config, label, field_type, options, form_context).await,
        Commands::History { limit } => run_history(config, limit).await,
    }
}
