//! Helpers around the rollback (translates `ql/methods/finitedifferences/utilities/`).

mod fdm_inner_value_calculator;

pub use fdm_inner_value_calculator::{
    FdmAverageInnerValue, FdmExtOUJumpModelInnerValue, FdmInnerValueCalculator, FdmLogInnerValue,
    FdmZeroInnerValue,
};
