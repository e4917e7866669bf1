pub mod capability;
pub mod diagnostics;

pub use capability::{
    CapabilityDescriptor, CapabilityRegistry, ProbeAbsence, ProbeError, RegistrationError,
    RegistrationOutcome, RegistrationPolicy,
};
