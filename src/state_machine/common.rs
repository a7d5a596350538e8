// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;

pub enum Transition<S, R> {
    Next(S, R),
    Stay(R),
    Done(R),
}

/// One state of a sequencer; `step` runs the state's work against the
/// context and reports where to go next.
pub trait StateMachine<Ctx, Resp>: Sized {
    fn step(&self, ctx: &mut Ctx) -> Resp;
}

pub trait StateMachineCtx<Ctx, Out = ()>: Sized {
    fn execute(&mut self) -> Result<Out>;
}
