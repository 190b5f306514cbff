use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;

pub const DEV_JWT_SECRET: &str = "sportsbuddy-dev-secret-not-for-production";

#[derive(Debug, Clone, Parser)]
#[command(name = "buddy-server")]
#[command(about = "SportsBuddy backend: accounts, profiles, user data and events")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "SPORTSBUDDY_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "SPORTSBUDDY_PORT", default_value_t = 3000)]
    pub port: u16,

    /// HMAC secret for session tokens
    #[arg(long, env = "SPORTSBUDDY_JWT_SECRET", default_value = DEV_JWT_SECRET, hide_env_values = true)]
    pub jwt_secret: String,

    /// Session token lifetime in hours
    #[arg(long, env = "SPORTSBUDDY_TOKEN_EXPIRY_HOURS", default_value_t = 24)]
    pub token_expiry_hours: i64,

    /// Skip creating the demo accounts at startup
    #[arg(long)]
    pub no_demo_accounts: bool,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
