// Copyright 2022 Matthew Ingwersen.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Implements the server configuration file.

use std::fmt;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::Level::Debug;
use log::{debug, log_enabled};
use paste::paste;
use serde::{de, Deserialize};

use fbear_dns::io::{BlockingIoConfig, BlockingIoProvider, BlockingShutdownController};
use fbear_dns::name::Name;
use fbear_dns::rr::{Ttl, Txt};
use fbear_dns::zone::FixedZone;

use crate::args::RunArgs;
use crate::run::Server;

////////////////////////////////////////////////////////////////////////
// CONFIGURATION LOADING                                              //
////////////////////////////////////////////////////////////////////////

/// Loads the server configuration from the file given by `path`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let raw_config =
        fs::read_to_string(path.as_ref()).context("failed to read the configuration file")?;
    let config = parse(&raw_config)?;
    log_config_summary(&config);
    Ok(config)
}

/// Parses the text of a configuration file.
fn parse(raw_config: &str) -> Result<Config> {
    toml::from_str(raw_config).context("failed to parse the configuration file")
}

/// Loads the server configuration from the parsed command line
/// arguments given by `args`.
pub fn load_from_args(args: &RunArgs) -> Config {
    let bind = args.bind.unwrap_or_else(|| {
        let ip = args.ip.unwrap_or(DEFAULT_BIND_IP);
        let port = args.port().unwrap_or(DEFAULT_BIND_PORT);
        SocketAddr::new(ip, port)
    });

    let config = Config {
        bind,
        io: IoProviderConfig::default(),
        zone: None,
    };
    log_config_summary(&config);
    config
}

/// Summarizes the configuration in the log, if the debug log level is
/// enabled.
fn log_config_summary(config: &Config) {
    if !log_enabled!(Debug) {
        // Don't compute the message if it will never be printed.
        return;
    }

    let zone = config.fixed_zone();
    debug!(
        "Configuration loaded:\n\
         Bind address: {}\n\
         I/O provider: {}\n\
         Zone:         {} (TTL {})",
        config.bind,
        config.io.name(),
        zone.name,
        zone.ttl,
    );
}

////////////////////////////////////////////////////////////////////////
// CONFIGURATION FILE STRUCTURE                                       //
////////////////////////////////////////////////////////////////////////

/// The complete configuration file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
    #[serde(default)]
    pub io: IoProviderConfig,
    pub zone: Option<ZoneConfig>,
}

impl Config {
    /// Returns the zone to serve: the reference zone with any
    /// configured overrides applied.
    pub fn fixed_zone(&self) -> FixedZone {
        let mut zone = FixedZone::default();
        if let Some(ref zone_config) = self.zone {
            zone_config.apply(&mut zone);
        }
        zone
    }
}

/// By default, the server listens on every interface.
const DEFAULT_BIND_IP: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_BIND_PORT: u16 = 53;

fn default_bind() -> SocketAddr {
    SocketAddr::new(DEFAULT_BIND_IP, DEFAULT_BIND_PORT)
}

////////////////////////////////////////////////////////////////////////
// CONFIGURATION SECTION: I/O PROVIDERS                               //
////////////////////////////////////////////////////////////////////////

/// The selection of I/O provider and its configuration.
///
/// To actually create the selected provider with its configuration,
/// bind it to an address and start it, use [`IoProviderConfig::start`].
#[derive(Debug, Deserialize)]
#[serde(tag = "provider")]
pub enum IoProviderConfig {
    #[serde(rename = "blocking")]
    Blocking(blocking_io::Config),
    #[cfg(feature = "tokio")]
    #[serde(rename = "tokio")]
    Tokio(tokio_io::Config),
}

impl Default for IoProviderConfig {
    fn default() -> Self {
        Self::Blocking(blocking_io::Config::default())
    }
}

impl IoProviderConfig {
    /// Returns the name of the selected I/O provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Blocking(_) => "blocking",
            #[cfg(feature = "tokio")]
            Self::Tokio(_) => "tokio",
        }
    }

    /// Creates the selected I/O provider with this configuration, binds
    /// it to the provided address, and starts it serving `server`.
    pub fn start(&self, addr: SocketAddr, server: Arc<Server>) -> Result<RunningProvider> {
        match self {
            Self::Blocking(config) => {
                let provider = BlockingIoProvider::bind(config.into(), addr)
                    .with_context(|| format!("failed to bind {}", addr))?;
                let controller = provider.start(server)?;
                Ok(RunningProvider::Blocking(controller))
            }
            #[cfg(feature = "tokio")]
            Self::Tokio(_) => tokio_io::start(addr, server),
        }
    }
}

/// A started I/O provider.
pub enum RunningProvider {
    Blocking(BlockingShutdownController),
    #[cfg(feature = "tokio")]
    Tokio(
        tokio::runtime::Runtime,
        fbear_dns::io::TokioShutdownController,
    ),
}

impl RunningProvider {
    /// Stops the provider and waits for it to finish.
    pub fn shut_down(self) {
        match self {
            Self::Blocking(controller) => controller.shut_down(),
            #[cfg(feature = "tokio")]
            Self::Tokio(runtime, controller) => runtime.block_on(controller.shut_down()),
        }
    }
}

/// Support for the
/// [`BlockingIoProvider`](fbear_dns::io::BlockingIoProvider).
mod blocking_io {
    use super::*;

    /// Provider configuration for the [`BlockingIoProvider`]. This
    /// mirrors [`BlockingIoConfig`] and can be converted into one; its
    /// purpose is basically to make the configuration deserializable
    /// and to provide defaults.
    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct Config {
        /// In seconds.
        #[serde(default = "default_read_timeout")]
        pub read_timeout: u64,
    }

    fn default_read_timeout() -> u64 {
        1
    }

    impl Default for Config {
        fn default() -> Self {
            Self {
                read_timeout: default_read_timeout(),
            }
        }
    }

    impl From<&Config> for BlockingIoConfig {
        fn from(toml_config: &Config) -> Self {
            Self {
                read_timeout: Duration::from_secs(toml_config.read_timeout.max(1)),
            }
        }
    }
}

/// Support for the [`TokioIoProvider`](fbear_dns::io::TokioIoProvider).
#[cfg(feature = "tokio")]
mod tokio_io {
    use super::*;
    use fbear_dns::io::TokioIoProvider;

    /// The Tokio provider has nothing to configure.
    #[derive(Debug, Default, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct Config {}

    pub fn start(addr: SocketAddr, server: Arc<Server>) -> Result<RunningProvider> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to start the Tokio runtime")?;
        let provider = runtime
            .block_on(TokioIoProvider::bind(addr))
            .with_context(|| format!("failed to bind {}", addr))?;
        let controller = {
            let _guard = runtime.enter();
            provider.start(server)
        };
        Ok(RunningProvider::Tokio(runtime, controller))
    }
}

////////////////////////////////////////////////////////////////////////
// CONFIGURATION SECTION: ZONE                                        //
////////////////////////////////////////////////////////////////////////

/// Overrides for the values of the served zone. Anything not given
/// keeps its value from the reference zone.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneConfig {
    pub name: Option<ConfigName>,
    pub ttl: Option<u32>,
    pub a: Option<Ipv4Addr>,
    pub aaaa: Option<Ipv6Addr>,
    pub mx_preference: Option<u16>,
    pub mx_exchange: Option<ConfigName>,
    pub txt: Option<ConfigTxt>,
}

impl ZoneConfig {
    /// Applies the overrides to `zone`.
    fn apply(&self, zone: &mut FixedZone) {
        if let Some(ref name) = self.name {
            zone.name = name.0.clone();
        }
        if let Some(ttl) = self.ttl {
            zone.ttl = Ttl::from(ttl);
        }
        if let Some(a) = self.a {
            zone.a = a;
        }
        if let Some(aaaa) = self.aaaa {
            zone.aaaa = aaaa;
        }
        if let Some(preference) = self.mx_preference {
            zone.mx_preference = preference;
        }
        if let Some(ref exchange) = self.mx_exchange {
            zone.mx_exchange = exchange.0.clone();
        }
        if let Some(ref txt) = self.txt {
            zone.txt = txt.0.clone();
        }
    }
}

////////////////////////////////////////////////////////////////////////
// WRAPPERS OVER FBEAR_DNS TYPES FOR SERDE                            //
////////////////////////////////////////////////////////////////////////

/// Generates a deserializable `ConfigX` structure wrapping an `X` type
/// from [`fbear_dns`], using a `&str` conversion.
macro_rules! make_serde_wrapper {
    ($wrapper:ident, $over:ty, $convert:path, $description:literal) => {
        /// A macro-generated deserializable wrapper over a
        /// [`fbear_dns`] type.
        #[derive(Clone, Debug)]
        pub struct $wrapper(pub $over);

        impl<'de> Deserialize<'de> for $wrapper {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: de::Deserializer<'de>,
            {
                deserializer.deserialize_str(paste! { [<$wrapper Visitor>] })
            }
        }

        paste! {
            /// A macro-generated [`Visitor`](de::Visitor).
            #[derive(Debug)]
            struct [<$wrapper Visitor>];
        }

        impl<'de> de::Visitor<'de> for paste! { [<$wrapper Visitor>] } {
            type Value = $wrapper;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str($description)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                $convert(value)
                    .map($wrapper)
                    .map_err(|e| E::custom(format!("invalid {}: {}", $description, e)))
            }
        }
    };
}

make_serde_wrapper!(ConfigName, Name, str::parse, "domain name");
make_serde_wrapper!(ConfigTxt, Txt, Txt::try_from, "TXT data");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.bind, default_bind());
        assert_eq!(config.io.name(), "blocking");
        assert_eq!(config.fixed_zone(), FixedZone::default());
    }

    #[test]
    fn zone_overrides_apply() {
        let config = parse(
            r#"
            bind = "127.0.0.1:5353"

            [io]
            provider = "blocking"
            read_timeout = 2

            [zone]
            name = "example.test."
            ttl = 300
            txt = "hello"
            "#,
        )
        .unwrap();
        assert_eq!(config.bind, "127.0.0.1:5353".parse().unwrap());
        let zone = config.fixed_zone();
        assert_eq!(zone.name.as_str(), "example.test");
        assert_eq!(u32::from(zone.ttl), 300);
        assert_eq!(zone.txt.as_str(), "hello");
        assert_eq!(zone.a, FixedZone::default().a);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(parse("[zone]\nname = \"a..b\"").is_err());
        assert!(parse(&format!("[zone]\ntxt = \"{}\"", "x".repeat(256))).is_err());
        assert!(parse("unknown = 1").is_err());
    }
}
