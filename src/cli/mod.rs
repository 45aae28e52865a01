use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::infra::config::Config;

#[derive(Parser)]
#[command(name = "weather-mcp-gateway")]
#[command(about = "Weather MCP Gateway - server and admin CLI")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the MCP server (default)
    Serve,
    /// Health check the service
    Health {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Validate configuration
    Config {
        /// Validate config without starting service
        #[arg(long)]
        validate: bool,
    },
    /// Show service status
    Status {
        /// Service URL to check
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
    },
    /// Print the registered tool configs as JSON
    Tools,
    /// Run one tool locally and print its result
    Call {
        /// Tool name, e.g. get_grid_point
        name: String,
        /// Tool arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        arguments: String,
    },
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Serve => match crate::infra::boot::run_server().await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "server exited with error");
                eprintln!("❌ Server failed: {e}");
                ExitCode::FAILURE
            }
        },
        Commands::Health { url } => match health_check(&url).await {
            Ok(_) => {
                println!("✅ Service is healthy");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Health check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Config { validate: _ } => match validate_config() {
            Ok(_) => {
                println!("✅ Configuration is valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Status { url } => match show_status(&url).await {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("❌ Status check failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Tools => match list_tools().await {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Tool discovery failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Call { name, arguments } => match call_tool(&name, &arguments).await {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Tool call failed: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

async fn health_check(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/healthz", url))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("HTTP {}", response.status()).into())
    }
}

fn validate_config() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    config.validate()?;
    Ok(())
}

async fn show_status(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();

    let health_response = client
        .get(format!("{}/healthz", url))
        .timeout(std::time::Duration::from_secs(5))
        .send()
        .await?;

    println!(
        "🏥 Health Status: {}",
        if health_response.status().is_success() {
            "✅ Healthy"
        } else {
            "❌ Unhealthy"
        }
    );

    let tools_response = client
        .post(format!("{}/rpc", url))
        .header("content-type", "application/json")
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/list",
            "params": {}
        }))
        .timeout(std::time::Duration::from_millis(500))
        .send()
        .await;

    match tools_response {
        Ok(resp) if resp.status().is_success() => {
            let count = resp
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| v["result"]["tools"].as_array().map(Vec::len));
            match count {
                Some(n) => println!("🔧 Tools: ✅ {n} available"),
                None => println!("🔧 Tools: ✅ Available"),
            }
        }
        Ok(resp) => {
            println!("🔧 Tools: ❌ HTTP {}", resp.status());
        }
        Err(_) => {
            println!("🔧 Tools: ❌ Unavailable");
        }
    }

    let cfg = Config::from_env();
    println!("\n📋 Configuration:");
    println!("  Mode: {}", cfg.mode);
    println!("  Port: {}", cfg.port);
    println!(
        "  Log Level: {}",
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())
    );
    println!("  NWS API: {}", cfg.weather.nws_base_url);
    match cfg.weather.identity.user_agent_header_text() {
        Ok(ua) => println!("  User-Agent: {ua}"),
        Err(_) => println!("  User-Agent: Not configured"),
    }

    Ok(())
}

async fn list_tools() -> Result<String, Box<dyn std::error::Error>> {
    let dispatcher = crate::infra::boot::load_dispatcher(&Config::from_env()).await?;
    let list = dispatcher.list_tools()?;
    Ok(serde_json::to_string_pretty(&list)?)
}

async fn call_tool(name: &str, arguments: &str) -> Result<String, Box<dyn std::error::Error>> {
    let arguments: crate::core::tool::Params =
        serde_json::from_str(arguments).map_err(|e| format!("--arguments must be a JSON object: {e}"))?;
    let dispatcher = crate::infra::boot::load_dispatcher(&Config::from_env()).await?;
    let out = dispatcher.call_tool(name, Some(arguments)).await?;
    Ok(serde_json::to_string_pretty(&out)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env() {
        for key in ["MODE", "PORT", "WEATHER_CONFIG", "WEATHER_APP_NAME", "WEATHER_APP_CONTACT", "DISABLED_TOOLS"] {
            env::remove_var(key);
        }
    }

    fn set_identity() {
        env::set_var("WEATHER_APP_NAME", "test-app");
        env::set_var("WEATHER_APP_CONTACT", "test@example.com");
    }

    #[tokio::test]
    async fn health_check_fails_without_service() {
        let result = health_check("http://localhost:9999").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn health_check_ok_and_error_paths() {
        use httpmock::prelude::*;
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/healthz");
            then.status(200).body("ok");
        });
        assert!(health_check(&server.base_url()).await.is_ok());

        let bad = MockServer::start();
        bad.mock(|when, then| {
            when.method(GET).path("/healthz");
            then.status(500);
        });
        assert!(health_check(&bad.base_url()).await.is_err());
    }

    #[test]
    #[serial]
    fn validate_config_valid() {
        clear_env();
        set_identity();
        env::set_var("MODE", "server");
        env::set_var("PORT", "8080");

        assert!(validate_config().is_ok());
        clear_env();
    }

    #[test]
    #[serial]
    fn validate_config_invalid_mode() {
        clear_env();
        set_identity();
        env::set_var("MODE", "invalid");

        let result = validate_config();
        assert!(result.unwrap_err().to_string().contains("Invalid MODE"));
        clear_env();
    }

    #[test]
    #[serial]
    fn validate_config_requires_identity() {
        clear_env();
        let result = validate_config();
        assert!(result.unwrap_err().to_string().contains("WEATHER_APP_NAME"));
    }

    #[test]
    #[serial]
    fn validate_config_invalid_port() {
        clear_env();
        set_identity();
        env::set_var("MODE", "server");
        env::set_var("PORT", "0");

        let result = validate_config();
        assert!(result.unwrap_err().to_string().contains("PORT cannot be 0"));
        clear_env();
    }

    #[tokio::test]
    async fn status_handles_non_200_health_and_tools() {
        use httpmock::prelude::*;
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/healthz");
            then.status(500).body("boom");
        });
        server.mock(|when, then| {
            when.method(POST).path("/rpc");
            then.status(500).body("boom");
        });

        assert!(show_status(&server.base_url()).await.is_ok());
    }

    #[tokio::test]
    async fn status_handles_unavailable_service() {
        assert!(show_status("http://localhost:9999").await.is_err());
    }

    #[tokio::test]
    #[serial]
    async fn tools_prints_every_registered_tool() {
        clear_env();
        let json = list_tools().await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["tools"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    #[serial]
    async fn call_reports_validation_text_without_network() {
        clear_env();
        let json = call_tool("get_daily_forecast", r#"{"gridPointUrl": 12345}"#).await.unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(v["content"][0]["text"].as_str().unwrap().starts_with("Invalid grid point URL"));
    }

    #[tokio::test]
    #[serial]
    async fn call_rejects_unknown_tools_and_bad_json() {
        clear_env();
        let err = call_tool("missing", "{}").await.unwrap_err();
        assert_eq!(err.to_string(), "Tool \"missing\" not found or no arguments provided.");
        let err = call_tool("get_grid_point", "[1, 2]").await.unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }

    #[tokio::test]
    #[serial]
    async fn run_commands_config_failure() {
        clear_env();
        env::set_var("MODE", "nope");
        let code = run_commands(Commands::Config { validate: true }).await;
        assert_eq!(code, ExitCode::FAILURE);
        clear_env();
    }

    #[tokio::test]
    async fn run_commands_health_success() {
        use httpmock::prelude::*;
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/healthz");
            then.status(200).body("ok");
        });
        let code = run_commands(Commands::Health { url: server.base_url() }).await;
        assert_eq!(code, ExitCode::SUCCESS);
    }
}
