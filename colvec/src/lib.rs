pub use colvec_vector::*;
pub use {
    colvec_buffer as buffer, colvec_dtype as dtype, colvec_error as error,
    colvec_vector as vector,
};
