//! Callbacks that adjust a configuration after the scalar flags are set.

use ormwire_core::Configuration;

/// Mutates a configuration during the build.
///
/// Settings run in insertion order, after the scalar flags and before any
/// registration, so they override injected flag values.
pub trait ConfigurationSetting: Send + Sync {
    fn apply_configuration_setting(&self, configuration: &mut Configuration);
}

impl<F> ConfigurationSetting for F
where
    F: Fn(&mut Configuration) + Send + Sync,
{
    fn apply_configuration_setting(&self, configuration: &mut Configuration) {
        self(configuration);
    }
}
