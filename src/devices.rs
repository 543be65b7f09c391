/// Pre-boot environment a device falls back to when its startup
/// configuration is bypassed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootEnvironment {
    /// Router ROM monitor, entered via a console break during boot.
    Rommon,
    /// Catalyst switch bootloader (`switch:` prompt).
    SwitchBootloader,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCategory {
    Router,
    Switch,
}

impl std::fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceCategory::Router => write!(f, "Router"),
            DeviceCategory::Switch => write!(f, "Switch"),
        }
    }
}

/// One supported device model. Static reference data, built once.
#[derive(Debug, Clone, Copy)]
pub struct Device {
    pub model: &'static str,
    pub category: DeviceCategory,
    pub boot_environment: BootEnvironment,
}

const fn router(model: &'static str) -> Device {
    Device {
        model,
        category: DeviceCategory::Router,
        boot_environment: BootEnvironment::Rommon,
    }
}

const fn switch(model: &'static str) -> Device {
    Device {
        model,
        category: DeviceCategory::Switch,
        boot_environment: BootEnvironment::SwitchBootloader,
    }
}

/// The supported device catalog.
pub const DEVICES: &[Device] = &[
    router("ISR 4321"),
    router("ISR 4331"),
    router("ISR 4351"),
    router("ASR 1001-X"),
    router("ASR 1002-X"),
    switch("Catalyst 2950"),
    switch("Catalyst 2960"),
    switch("Catalyst 2960X"),
    switch("Catalyst 3560"),
    switch("Catalyst 3750"),
];

/// Look a device up by its exact model name.
pub fn find_device(model: &str) -> Option<&'static Device> {
    DEVICES.iter().find(|d| d.model == model)
}
