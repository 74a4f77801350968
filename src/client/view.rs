/// Screen the console shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    VesselSetupRequired,
    UserSetupRequired,
    LoginRequired,
    AwaitingVesselFetch,
    Ready,
    /// Transient "session closed" notice shown while a logout completes.
    LoggingOut,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewInputs {
    pub user_required: bool,
    pub vessel_required: bool,
    pub is_logged_in: bool,
    pub vessel_loaded: bool,
    pub logging_out: bool,
}

/// First matching rule wins.
pub fn select_view(inputs: &ViewInputs) -> View {
    if inputs.logging_out {
        View::LoggingOut
    } else if inputs.vessel_required {
        View::VesselSetupRequired
    } else if inputs.user_required {
        View::UserSetupRequired
    } else if !inputs.is_logged_in {
        View::LoginRequired
    } else if !inputs.vessel_loaded {
        View::AwaitingVesselFetch
    } else {
        View::Ready
    }
}
