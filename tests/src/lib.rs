//! Integration tests for update runs against a scratch program directory.
//!
//! [`fixture`] builds the on-disk layout and provides in-memory stand-ins for
//! the system and fetcher ports, so no run touches the network or `/etc`.


#[cfg(test)]
mod update;
