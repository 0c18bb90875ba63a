/// rsfn: optional
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub tls: bool,
}

include!(concat!(env!("OUT_DIR"), "/server_config_optional_gen.rs"));

impl ServerConfig {
    /// Options applied over the usual local defaults
    pub fn local(options: impl IntoIterator<Item = ServerConfigOption>) -> Self {
        let defaults = [
            ServerConfig::with_host("127.0.0.1".to_string()),
            ServerConfig::with_port(8080),
            ServerConfig::with_workers(4),
        ];
        ServerConfig::with_options(defaults.into_iter().chain(options))
    }
}
