//! Client and site directory.
//!
//! A client owns one or more sites (house, shop, storage, factory); every site
//! is monitored by its own set of sensors and addressed by a numeric site id.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Alarm zones of a site.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Zones {
    /// Zones monitored in normal operation.
    pub normal: Vec<String>,
    /// Zones that raise an alert immediately.
    pub alert: Vec<String>,
}

/// A physical location monitored by one set of sensors.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Site {
    /// Site identifier, also sent as `client_id` to the remote API.
    pub site_id: u32,
    /// Kind of premises ("House", "Shop1", ...).
    pub site_type: String,
    /// Street address.
    pub address: String,
    /// Alarm zones.
    pub zones: Zones,
}

/// A customer with their sites.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Client {
    /// Client identifier.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Sites owned by the client, in display order.
    pub sites: Vec<Site>,
}

/// A site together with the client that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteRef<'a> {
    pub client: &'a Client,
    pub site: &'a Site,
}

/// Catalogue of known clients and sites.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Directory {
    pub clients: Vec<Client>,
}

impl Directory {
    /// Create a directory from a list of clients.
    pub fn new(clients: Vec<Client>) -> Self {
        Self { clients }
    }

    /// The built-in demo directory shipped with the dashboard.
    pub fn builtin() -> Self {
        fn site(site_id: u32, site_type: &str, address: &str, normal: &[&str], alert: &[&str]) -> Site {
            Site {
                site_id,
                site_type: site_type.to_string(),
                address: address.to_string(),
                zones: Zones {
                    normal: normal.iter().map(|z| z.to_string()).collect(),
                    alert: alert.iter().map(|z| z.to_string()).collect(),
                },
            }
        }

        Self::new(vec![
            Client {
                id: 1,
                name: "Ali".to_string(),
                sites: vec![
                    site(1, "House", "123 Main St", &["Living Room", "Kitchen"], &["Front Door"]),
                    site(2, "Storage", "456 Elm St", &["Storage Room", "Office"], &["Back Door"]),
                ],
            },
            Client {
                id: 2,
                name: "Ahmed".to_string(),
                sites: vec![
                    site(3, "Shop1", "789 Oak St", &["Main Hall"], &["Shop Entrance"]),
                    site(4, "Shop2", "101 Pine St", &["Cash Counter"], &["Emergency Exit"]),
                ],
            },
            Client {
                id: 3,
                name: "Sara".to_string(),
                sites: vec![site(5, "Factory", "789 Oak St", &["Gate"], &["Office"])],
            },
        ])
    }

    /// Look up a client by id.
    pub fn find_client(&self, id: u32) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Look up a site by id across all clients.
    pub fn find_site(&self, site_id: u32) -> Option<SiteRef<'_>> {
        self.clients.iter().find_map(|client| {
            client
                .sites
                .iter()
                .find(|s| s.site_id == site_id)
                .map(|site| SiteRef { client, site })
        })
    }

    /// Iterate over every site with its owner.
    pub fn sites(&self) -> impl Iterator<Item = SiteRef<'_>> {
        self.clients
            .iter()
            .flat_map(|client| client.sites.iter().map(move |site| SiteRef { client, site }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_directory() {
        let dir = Directory::builtin();
        assert_eq!(dir.clients.len(), 3);
        assert_eq!(dir.sites().count(), 5);
        assert_eq!(dir.find_client(2).map(|c| c.name.as_str()), Some("Ahmed"));
        assert!(dir.find_client(9).is_none());
    }

    #[test]
    fn test_find_site_returns_owner() {
        let dir = Directory::builtin();
        let found = dir.find_site(5).unwrap();
        assert_eq!(found.client.name, "Sara");
        assert_eq!(found.site.site_type, "Factory");
        assert_eq!(found.site.zones.alert, vec!["Office".to_string()]);
        assert!(dir.find_site(0).is_none());
    }
}
