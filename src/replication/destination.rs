//! Destination resolution
//!
//! A source dataset maps to one target per side of the topology:
//! `<base>/<encoded source>`. Local is always listed before remote.

use std::fmt;

use serde::Serialize;

use crate::config::{DestinationBases, DestinationTopology};
use crate::dataset::{DatasetName, PathCodec};
use crate::remote::{Location, RemoteEndpoint};

use super::errors::{ReplicationError, ReplicationResult};

/// One concrete replica location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationTarget {
    pub location: Location,
    /// Configured base the target lives under
    pub base: DatasetName,
    pub dataset: DatasetName,
}

impl DestinationTarget {
    /// `dataset` locally, `user@host:dataset` remotely
    pub fn address(&self) -> String {
        match &self.location {
            Location::Local => self.dataset.to_string(),
            Location::Remote(endpoint) => endpoint.address(self.dataset.as_str()),
        }
    }

    pub fn side(&self) -> &'static str {
        if self.location.is_remote() {
            "remote"
        } else {
            "local"
        }
    }
}

impl fmt::Display for DestinationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address())
    }
}

impl Serialize for DestinationTarget {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.address())
    }
}

/// Pure mapping from source dataset to destination targets.
#[derive(Debug, Clone)]
pub struct DestinationResolver<'a> {
    topology: DestinationTopology,
    bases: &'a DestinationBases,
    remote: Option<&'a RemoteEndpoint>,
    codec: &'a PathCodec,
}

impl<'a> DestinationResolver<'a> {
    pub fn new(
        topology: DestinationTopology,
        bases: &'a DestinationBases,
        remote: Option<&'a RemoteEndpoint>,
        codec: &'a PathCodec,
    ) -> Self {
        Self {
            topology,
            bases,
            remote,
            codec,
        }
    }

    pub fn resolve(&self, dataset: &DatasetName) -> ReplicationResult<Vec<DestinationTarget>> {
        let mut targets = Vec::with_capacity(2);
        if self.topology.includes_local() {
            let base = self
                .bases
                .local
                .as_ref()
                .ok_or(ReplicationError::Unconfigured { side: "local" })?;
            targets.push(self.target(Location::Local, base, dataset)?);
        }
        if self.topology.includes_remote() {
            let base = self
                .bases
                .remote
                .as_ref()
                .ok_or(ReplicationError::Unconfigured { side: "remote" })?;
            let endpoint = self
                .remote
                .ok_or(ReplicationError::Unconfigured { side: "remote" })?;
            targets.push(self.target(Location::Remote(endpoint.clone()), base, dataset)?);
        }
        Ok(targets)
    }

    /// The destination dataset of `source` under `base`
    pub fn target_name(&self, base: &DatasetName, source: &DatasetName) -> ReplicationResult<DatasetName> {
        base.join(&self.codec.encode(source))
            .map_err(|e| ReplicationError::Source(e.into()))
    }

    fn target(
        &self,
        location: Location,
        base: &DatasetName,
        source: &DatasetName,
    ) -> ReplicationResult<DestinationTarget> {
        Ok(DestinationTarget {
            location,
            base: base.clone(),
            dataset: self.target_name(base, source)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> DatasetName {
        DatasetName::parse(s).unwrap()
    }

    fn bases() -> DestinationBases {
        DestinationBases {
            local: Some(name("backup/replication")),
            remote: Some(name("vault/replication")),
        }
    }

    #[test]
    fn test_remote_target_address() {
        let bases = bases();
        let endpoint = RemoteEndpoint::new("root", "10.0.0.5");
        let codec = PathCodec::default();
        let resolver =
            DestinationResolver::new(DestinationTopology::Remote, &bases, Some(&endpoint), &codec);

        let targets = resolver.resolve(&name("cache/appdata")).unwrap();

        assert_eq!(targets.len(), 1);
        assert_eq!(
            targets[0].to_string(),
            "root@10.0.0.5:vault/replication/cache_appdata"
        );
        assert_eq!(targets[0].side(), "remote");
    }

    #[test]
    fn test_target_counts_per_topology() {
        let bases = bases();
        let endpoint = RemoteEndpoint::new("root", "10.0.0.5");
        let codec = PathCodec::default();
        let source = name("cache/appdata");

        let local = DestinationResolver::new(DestinationTopology::Local, &bases, None, &codec)
            .resolve(&source)
            .unwrap();
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].address(), "backup/replication/cache_appdata");

        let both =
            DestinationResolver::new(DestinationTopology::Both, &bases, Some(&endpoint), &codec)
                .resolve(&source)
                .unwrap();
        assert_eq!(both.len(), 2);
        assert_eq!(both[0].location, Location::Local);
        assert_eq!(both[0].base, name("backup/replication"));
        assert!(both[1].location.is_remote());
        assert_eq!(both[1].base, name("vault/replication"));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let bases = bases();
        let endpoint = RemoteEndpoint::new("u", "h");
        let codec = PathCodec::default();
        let resolver =
            DestinationResolver::new(DestinationTopology::Both, &bases, Some(&endpoint), &codec);
        let source = name("pool/a/b/c");

        assert_eq!(resolver.resolve(&source).unwrap(), resolver.resolve(&source).unwrap());
        assert_eq!(
            resolver.resolve(&source).unwrap()[0].dataset,
            name("backup/replication/pool_a_b_c")
        );
    }

    #[test]
    fn test_missing_side_is_reported() {
        let bases = DestinationBases::default();
        let codec = PathCodec::default();
        let err = DestinationResolver::new(DestinationTopology::Local, &bases, None, &codec)
            .resolve(&name("a"))
            .unwrap_err();
        assert!(matches!(err, ReplicationError::Unconfigured { side: "local" }));
    }
}
