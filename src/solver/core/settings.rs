use crate::algebra::*;
use derive_builder::Builder;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Error, Debug, PartialEq, Eq)]
/// Error type returned by settings validation
pub enum SettingsError {
    /// An error attributable to one of the fields
    #[error("Bad value for field \"{0}\"")]
    BadFieldValue(&'static str),
}

/// When to run the Slater condition checks, and when to report them
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SlaterCheck {
    /// never check
    #[default]
    None,
    /// check on every solve, report only if the solve failed
    OnFailure,
    /// check on every solve and always report
    Always,
}

/// Parameters of the interface, addressable by key through
/// [`get_param`](SdpiSettings::get_param) and
/// [`set_param`](SdpiSettings::set_param)
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub enum SdpiParam {
    Epsilon,
    Gaptol,
    Feastol,
    PenaltyParam,
    MaxPenaltyParam,
    PenInfeasAdjust,
    NPenaltyIncr,
    SlaterCheck,
}

/// Settings of the SDP interface
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SdpiSettings<T: FloatT> {
    ///tolerance for fixing variables and dropping matrix entries
    #[builder(default = "(1e-9).as_T()")]
    pub epsilon: T,

    ///duality gap tolerance passed to the external solver
    #[builder(default = "(1e-4).as_T()")]
    pub gaptol: T,

    ///feasibility tolerance
    #[builder(default = "(1e-6).as_T()")]
    pub feastol: T,

    ///initial penalty weight Γ
    #[builder(default = "(1e5).as_T()")]
    pub penaltyparam: T,

    ///largest penalty weight tried in the escalation loop
    #[builder(default = "(1e10).as_T()")]
    pub maxpenaltyparam: T,

    ///a feasibility penalty objective above
    ///peninfeasadjust * max(feastol, gaptol) certifies infeasibility
    #[builder(default = "(10.).as_T()")]
    pub peninfeasadjust: T,

    ///number of geometric escalation steps for the penalty weight
    ///and the gap tolerance
    #[builder(default = "8")]
    pub npenaltyincr: u32,

    ///Slater condition checking level
    #[builder(default = "SlaterCheck::None")]
    pub slatercheck: SlaterCheck,

    ///verbose printing
    #[builder(default = "false")]
    pub verbose: bool,
}

impl<T> Default for SdpiSettings<T>
where
    T: FloatT,
{
    fn default() -> SdpiSettings<T> {
        Self {
            epsilon: (1e-9).as_T(),
            gaptol: (1e-4).as_T(),
            feastol: (1e-6).as_T(),
            penaltyparam: (1e5).as_T(),
            maxpenaltyparam: (1e10).as_T(),
            peninfeasadjust: (10.).as_T(),
            npenaltyincr: 8,
            slatercheck: SlaterCheck::None,
            verbose: false,
        }
    }
}

macro_rules! check_nonnegative {
    ($self:expr, $field:ident) => {
        if !($self.$field >= T::zero()) {
            return Err(SettingsError::BadFieldValue(stringify!($field)));
        }
    };
}

impl<T> SdpiSettings<T>
where
    T: FloatT,
{
    /// Checks that all numerical values are in their legal ranges
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_nonnegative!(self, epsilon);
        check_nonnegative!(self, gaptol);
        check_nonnegative!(self, feastol);
        check_nonnegative!(self, penaltyparam);
        check_nonnegative!(self, peninfeasadjust);
        validate_penalty_range(self.penaltyparam, self.maxpenaltyparam)
    }

    /// Reads a parameter by key.  Integer valued parameters are
    /// returned as floats.
    pub fn get_param(&self, param: SdpiParam) -> T {
        match param {
            SdpiParam::Epsilon => self.epsilon,
            SdpiParam::Gaptol => self.gaptol,
            SdpiParam::Feastol => self.feastol,
            SdpiParam::PenaltyParam => self.penaltyparam,
            SdpiParam::MaxPenaltyParam => self.maxpenaltyparam,
            SdpiParam::PenInfeasAdjust => self.peninfeasadjust,
            SdpiParam::NPenaltyIncr => self.npenaltyincr.as_T(),
            SdpiParam::SlaterCheck => (self.slatercheck as u32).as_T(),
        }
    }

    /// Sets a parameter by key.
    ///
    /// The penalty weights are kept ordered: raising `PenaltyParam` above
    /// the current maximum raises the maximum with it, and lowering
    /// `MaxPenaltyParam` below the initial weight lowers the initial weight.
    pub fn set_param(&mut self, param: SdpiParam, value: T) -> Result<(), SettingsError> {
        let mut new = self.clone();
        match param {
            SdpiParam::Epsilon => new.epsilon = value,
            SdpiParam::Gaptol => new.gaptol = value,
            SdpiParam::Feastol => new.feastol = value,
            SdpiParam::PenaltyParam => {
                new.penaltyparam = value;
                new.maxpenaltyparam = T::max(new.maxpenaltyparam, value);
            }
            SdpiParam::MaxPenaltyParam => {
                new.maxpenaltyparam = value;
                if new.penaltyparam > value {
                    tracing::debug!(
                        "decreasing penalty parameter {} to maximal penalty parameter {}",
                        new.penaltyparam,
                        value
                    );
                    new.penaltyparam = value;
                }
            }
            SdpiParam::PenInfeasAdjust => new.peninfeasadjust = value,
            SdpiParam::NPenaltyIncr => {
                new.npenaltyincr = value
                    .to_u32()
                    .filter(|&n| AsFloatT::<T>::as_T(&n) == value)
                    .ok_or(SettingsError::BadFieldValue("npenaltyincr"))?;
            }
            SdpiParam::SlaterCheck => {
                new.slatercheck = match value.to_u32() {
                    Some(0) if value == T::zero() => SlaterCheck::None,
                    Some(1) if value == T::one() => SlaterCheck::OnFailure,
                    Some(2) if value == (2.).as_T() => SlaterCheck::Always,
                    _ => return Err(SettingsError::BadFieldValue("slatercheck")),
                };
            }
        }
        new.validate()?;
        *self = new;
        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for SdpiSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        SdpiSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> SdpiSettingsBuilder<T>
where
    T: FloatT,
{
    /// check that the penalty weights are ordered when both are given
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let (Some(pen), Some(maxpen)) = (self.penaltyparam, self.maxpenaltyparam) {
            validate_penalty_range(pen, maxpen)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn validate_penalty_range<T: FloatT>(pen: T, maxpen: T) -> Result<(), SettingsError> {
    if maxpen >= pen {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue("maxpenaltyparam"))
    }
}
