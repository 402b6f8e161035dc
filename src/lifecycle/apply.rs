//! Service activation

use tracing::info;

use crate::config::EffectiveConfig;
use crate::service::{ServiceError, ServiceManager, UnitAction};
use crate::settings::UnitNames;

/// Bring the service in line with the configuration.
///
/// Disabled stops the service and its socket. Otherwise the service is
/// reloaded, or fully restarted when a binding changed: a running daemon
/// cannot move into another VRF.
pub fn apply(
    config: Option<&EffectiveConfig>,
    units: &UnitNames,
    services: &dyn ServiceManager,
) -> Result<UnitAction, ServiceError> {
    let Some(config) = config else {
        services.control(UnitAction::Stop, &[units.service.as_str(), units.socket.as_str()])?;
        return Ok(UnitAction::Stop);
    };

    let action = if config.restart_required {
        UnitAction::Restart
    } else {
        UnitAction::ReloadOrRestart
    };
    info!(%action, unit = %units.service, "applying configuration");
    services.control(action, &[units.service.as_str()])?;

    Ok(action)
}
