//! Test doubles shared by the crates' unit tests.

pub mod artifacts;
pub mod chain;

pub use chain::{FakeChain, Membership};
use network::{Configuration, Environment, Network, NetworkProfile};

/// Profile of a development network, resolved without touching the process
/// environment.
pub fn dev_profile(network: Network) -> NetworkProfile {
    NetworkProfile::resolve(network, &Environment::default(), &Configuration::default())
        .expect("development profiles resolve without configuration")
}
