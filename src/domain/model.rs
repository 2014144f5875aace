use crate::utils::error::Result;
use crate::utils::validation::validate_one_of;
use serde::{Deserialize, Serialize};

/// 已解析的 project / region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub project_id: i64,
    pub region_id: i64,
}

/// 列表端點的標準回應格式
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub count: usize,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDetailed {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub read_only: bool,
}

macro_rules! api_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $value)] $variant),+
        }

        impl $name {
            pub const VALUES: &'static [&'static str] = &[$($value),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }

            pub fn parse(field: &str, value: &str) -> Result<Self> {
                Self::parse_within(field, value, Self::VALUES)
            }

            /// 只接受 `allowed` 內的值
            pub fn parse_within(field: &str, value: &str, allowed: &[&str]) -> Result<Self> {
                validate_one_of(field, value, allowed)?;
                match value {
                    $($value => Ok($name::$variant),)+
                    _ => Err(crate::utils::error::EdgeError::validation(format!(
                        "unsupported {} value '{}'",
                        field, value
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

api_enum!(LbAlgorithm {
    RoundRobin => "ROUND_ROBIN",
    LeastConnections => "LEAST_CONNECTIONS",
    SourceIp => "SOURCE_IP",
    SourceIpPort => "SOURCE_IP_PORT",
});

api_enum!(LbProtocol {
    Http => "HTTP",
    Https => "HTTPS",
    Tcp => "TCP",
    Udp => "UDP",
    TerminatedHttps => "TERMINATED_HTTPS",
    Proxy => "PROXY",
});

impl LbProtocol {
    /// Pool 設定可使用的協定
    pub const POOL_VALUES: &'static [&'static str] = &["HTTP", "HTTPS", "TCP", "UDP"];
}

api_enum!(HealthMonitorType {
    Http => "HTTP",
    Https => "HTTPS",
    Ping => "PING",
    Tcp => "TCP",
    TlsHello => "TLS-HELLO",
    UdpConnect => "UDP-CONNECT",
});

api_enum!(InterfaceType {
    Subnet => "subnet",
    AnySubnet => "any_subnet",
    External => "external",
    ReservedFixedIp => "reserved_fixed_ip",
});

api_enum!(FloatingIpSource {
    New => "new",
    Existing => "existing",
});

api_enum!(VolumeSource {
    NewVolume => "new-volume",
    Image => "image",
    Snapshot => "snapshot",
});

api_enum!(GatewayType {
    Manual => "manual",
    Default => "default",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_values() {
        assert_eq!(
            LbAlgorithm::parse("lb_algorithm", "SOURCE_IP_PORT").unwrap(),
            LbAlgorithm::SourceIpPort
        );
        assert_eq!(
            HealthMonitorType::parse("type", "TLS-HELLO").unwrap(),
            HealthMonitorType::TlsHello
        );
        assert_eq!(VolumeSource::parse("source", "new-volume").unwrap().as_str(), "new-volume");
    }

    #[test]
    fn test_pool_protocol_rejects_listener_only_values() {
        assert!(LbProtocol::parse("protocol", "PROXY").is_ok());
        assert!(LbProtocol::parse_within("protocol", "PROXY", LbProtocol::POOL_VALUES).is_err());
        assert!(
            LbProtocol::parse_within("protocol", "TERMINATED_HTTPS", LbProtocol::POOL_VALUES)
                .is_err()
        );
        assert_eq!(
            LbProtocol::parse_within("protocol", "UDP", LbProtocol::POOL_VALUES).unwrap(),
            LbProtocol::Udp
        );
    }

    #[test]
    fn test_enum_serializes_to_wire_value() {
        let json = serde_json::to_string(&InterfaceType::ReservedFixedIp).unwrap();
        assert_eq!(json, "\"reserved_fixed_ip\"");
        let parsed: LbAlgorithm = serde_json::from_str("\"LEAST_CONNECTIONS\"").unwrap();
        assert_eq!(parsed, LbAlgorithm::LeastConnections);
    }
}
