// ---------------------------------
// Status types reported by the interface
// ---------------------------------

/// Outcome of the single variable solver for problems with one free
/// variable and at most one SDP block.
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
pub enum OneVarStatus {
    /// No single variable solve took place (or it gave no answer)
    #[default]
    Unsolved,
    /// The problem was solved to optimality
    Optimal,
    /// The problem was shown to be infeasible
    Infeasible,
}

/// Result of a Slater condition test for either the primal or the dual
/// problem.
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
pub enum SdpSlater {
    /// The test gave no information
    #[default]
    NoInfo,
    /// The Slater condition does not hold
    Not,
    /// The Slater condition holds
    Holds,
    /// The problem is infeasible, hence the Slater condition fails
    Inf,
}

/// Parameter setting under which the external solver produced its result
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
pub enum SolverSetting {
    /// No external solve was used (or none succeeded)
    #[default]
    Unsolved,
    /// Fast default settings
    Fast,
    /// Medium settings
    Medium,
    /// Stable settings
    Stable,
    /// The penalty formulation was used
    Penalty,
}

/// Combination of the Slater condition results and the solver setting
/// that succeeded.  Used to compile statistics on the relation between
/// constraint qualification and numerical difficulty.
#[repr(u32)]
#[derive(PartialEq, Eq, Clone, Debug, Copy, Default)]
pub enum SlaterSetting {
    #[default]
    NoInfo,
    StableWSlater,
    UnstableWSlater,
    PenaltyWSlater,
    BoundedWSlater,
    UnsolvedWSlater,
    StableNoSlater,
    UnstableNoSlater,
    PenaltyNoSlater,
    BoundedNoSlater,
    UnsolvedNoSlater,
    StableInfeasible,
    UnstableInfeasible,
    PenaltyInfeasible,
    BoundedInfeasible,
    UnsolvedInfeasible,
}

// How the Slater results classify the problem, independent of the
// setting that was used to solve it.
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
enum SlaterKind {
    WSlater,
    NoSlater,
    Infeasible,
}

// The setting category of the combined table
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub(crate) enum SettingClass {
    Stable,
    Unstable,
    Penalty,
    Bounded,
    Unsolved,
}

impl SlaterSetting {
    /// Combines a primal and dual Slater result with a setting class.
    pub(crate) fn combine(primal: SdpSlater, dual: SdpSlater, class: SettingClass) -> Self {
        use SettingClass as C;
        use SlaterKind as K;

        let kind = match (primal, dual) {
            (_, SdpSlater::Inf) => Some(K::Infeasible),
            (SdpSlater::Not, _) | (_, SdpSlater::Not) => Some(K::NoSlater),
            (SdpSlater::Holds, SdpSlater::Holds) => Some(K::WSlater),
            _ => None,
        };

        match (kind, class) {
            (None, _) => SlaterSetting::NoInfo,
            (Some(K::WSlater), C::Stable) => SlaterSetting::StableWSlater,
            (Some(K::WSlater), C::Unstable) => SlaterSetting::UnstableWSlater,
            (Some(K::WSlater), C::Penalty) => SlaterSetting::PenaltyWSlater,
            (Some(K::WSlater), C::Bounded) => SlaterSetting::BoundedWSlater,
            (Some(K::WSlater), C::Unsolved) => SlaterSetting::UnsolvedWSlater,
            (Some(K::NoSlater), C::Stable) => SlaterSetting::StableNoSlater,
            (Some(K::NoSlater), C::Unstable) => SlaterSetting::UnstableNoSlater,
            (Some(K::NoSlater), C::Penalty) => SlaterSetting::PenaltyNoSlater,
            (Some(K::NoSlater), C::Bounded) => SlaterSetting::BoundedNoSlater,
            (Some(K::NoSlater), C::Unsolved) => SlaterSetting::UnsolvedNoSlater,
            (Some(K::Infeasible), C::Stable) => SlaterSetting::StableInfeasible,
            (Some(K::Infeasible), C::Unstable) => SlaterSetting::UnstableInfeasible,
            (Some(K::Infeasible), C::Penalty) => SlaterSetting::PenaltyInfeasible,
            (Some(K::Infeasible), C::Bounded) => SlaterSetting::BoundedInfeasible,
            (Some(K::Infeasible), C::Unsolved) => SlaterSetting::UnsolvedInfeasible,
        }
    }
}

macro_rules! impl_display_as_debug {
    ($($ty:ty),+) => {
        $(
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{:?}", self)
            }
        }
        )+
    };
}
impl_display_as_debug!(OneVarStatus, SdpSlater, SolverSetting, SlaterSetting);

#[test]
fn test_slater_setting_combine() {
    use SdpSlater::*;
    assert_eq!(
        SlaterSetting::combine(Holds, Holds, SettingClass::Stable),
        SlaterSetting::StableWSlater
    );
    assert_eq!(
        SlaterSetting::combine(Holds, Not, SettingClass::Penalty),
        SlaterSetting::PenaltyNoSlater
    );
    assert_eq!(
        SlaterSetting::combine(Not, Inf, SettingClass::Unsolved),
        SlaterSetting::UnsolvedInfeasible
    );
    assert_eq!(
        SlaterSetting::combine(NoInfo, Holds, SettingClass::Bounded),
        SlaterSetting::NoInfo
    );
    assert_eq!(format!("{}", SlaterSetting::UnstableNoSlater), "UnstableNoSlater");
}
