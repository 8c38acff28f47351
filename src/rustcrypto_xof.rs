//! # RustCrypto digest trait implementation
//!
//! This module provides implementations of the RustCrypto `digest` XOF traits for [`Kt128`].
//!
//! The trait methods cannot report errors. They panic if the worker pool fails to start, and
//! [`Update::update`] panics when called after output was read through [`Kt128::read`] or after
//! an earlier failure.

use crate::Kt128;
use crate::sponge::Sponge;
use digest::{ExtendableOutput, ExtendableOutputReset, HashMarker, Reset, Update, XofReader};

/// Output reader returned by [`ExtendableOutput::finalize_xof`].
#[derive(Clone)]
pub struct Kt128Reader {
    sponge: Sponge,
}

impl XofReader for Kt128Reader {
    #[inline]
    fn read(&mut self, buffer: &mut [u8]) {
        self.sponge.squeeze(buffer);
    }
}

impl Update for Kt128 {
    #[inline]
    fn update(&mut self, data: &[u8]) {
        if let Err(err) = self.write(data) {
            panic!("KT128 update failed: {err}");
        }
    }
}

impl ExtendableOutput for Kt128 {
    type Reader = Kt128Reader;

    fn finalize_xof(mut self) -> Self::Reader {
        match self.take_output() {
            Ok(sponge) => Kt128Reader { sponge },
            Err(err) => panic!("KT128 finalization failed: {err}"),
        }
    }
}

impl ExtendableOutputReset for Kt128 {
    fn finalize_xof_reset(&mut self) -> Self::Reader {
        let reader = match self.take_output() {
            Ok(sponge) => Kt128Reader { sponge },
            Err(err) => panic!("KT128 finalization failed: {err}"),
        };
        Kt128::reset(self);
        reader
    }
}

impl Reset for Kt128 {
    #[inline]
    fn reset(&mut self) {
        Kt128::reset(self);
    }
}

impl HashMarker for Kt128 {}
