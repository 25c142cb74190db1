//! Simulation components and the closed set of block kinds.
//!
//! A component is the running counterpart of one block: a tri-state `state`,
//! the list of inputs it reads, and a [`Behavior`] carrying whatever private
//! state its kind needs between ticks.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clock::Clock;
use crate::components::{AndGate, Inverter, OrGate, Passthrough, SrMemory, Timer, TimerMode, XorGate};
use crate::error::PropertyError;
use crate::logic::Logic;
use crate::page::Properties;
use crate::properties::{DelayConfig, GateConfig, Priority};
use crate::types::{BlockId, ComponentId};

/// Every block kind the engine can simulate.
///
/// Input pins are read in the block's pin order. For the set/reset kinds the
/// first input is Set and the second Reset; their first output pin carries
/// the stored state and the second output pin its complement. Every other
/// kind drives all of its output pins with the same value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Signal,
    Input,
    Output,
    And,
    Or,
    Xor,
    Not,
    /// Set/reset memory, priority read from the `Priority` property.
    SrMemory,
    /// Set/reset memory where Set wins.
    SrSetPriority,
    /// Set/reset memory where Reset wins.
    SrResetPriority,
    TimerOn,
    TimerOff,
    TimerPulse,
}

impl BlockKind {
    /// All kinds, in registration order.
    pub const ALL: [BlockKind; 13] = [
        BlockKind::Signal,
        BlockKind::Input,
        BlockKind::Output,
        BlockKind::And,
        BlockKind::Or,
        BlockKind::Xor,
        BlockKind::Not,
        BlockKind::SrMemory,
        BlockKind::SrSetPriority,
        BlockKind::SrResetPriority,
        BlockKind::TimerOn,
        BlockKind::TimerOff,
        BlockKind::TimerPulse,
    ];

    /// Block name this kind is registered under by default.
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Signal => "Signal",
            BlockKind::Input => "Input",
            BlockKind::Output => "Output",
            BlockKind::And => "AND",
            BlockKind::Or => "OR",
            BlockKind::Xor => "XOR",
            BlockKind::Not => "NOT",
            BlockKind::SrMemory => "SR",
            BlockKind::SrSetPriority => "SR-S",
            BlockKind::SrResetPriority => "SR-R",
            BlockKind::TimerOn => "TON",
            BlockKind::TimerOff => "TOF",
            BlockKind::TimerPulse => "TP",
        }
    }

    /// Looks a kind up by its default name.
    pub fn from_name(name: &str) -> Option<BlockKind> {
        BlockKind::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Returns true for kinds that keep state between ticks and may
    /// therefore read their own previous output through a feedback loop.
    pub fn is_stateful(self) -> bool {
        matches!(
            self,
            BlockKind::SrMemory
                | BlockKind::SrSetPriority
                | BlockKind::SrResetPriority
                | BlockKind::TimerOn
                | BlockKind::TimerOff
                | BlockKind::TimerPulse
        )
    }

    /// Largest number of wired inputs this kind reads, `None` for n-ary
    /// gates.
    pub fn arity(self) -> Option<usize> {
        match self {
            BlockKind::And | BlockKind::Or | BlockKind::Xor => None,
            BlockKind::SrMemory | BlockKind::SrSetPriority | BlockKind::SrResetPriority => Some(2),
            _ => Some(1),
        }
    }

    /// Returns true if the output pin at `index` (counting output pins only)
    /// carries the complement of the component state.
    pub fn is_complement_output(self, index: usize) -> bool {
        index == 1
            && matches!(
                self,
                BlockKind::SrMemory | BlockKind::SrSetPriority | BlockKind::SrResetPriority
            )
    }

    /// Builds the behavior of this kind from a block's properties.
    ///
    /// Timer delays are converted to cycles with `clock`'s resolution.
    pub fn build(self, props: &Properties, clock: &Clock) -> Result<Behavior, PropertyError> {
        let behavior = match self {
            BlockKind::Signal | BlockKind::Input | BlockKind::Output => Behavior::Passthrough(Passthrough),
            BlockKind::And => Behavior::And(AndGate),
            BlockKind::Or => Behavior::Or(OrGate::new(GateConfig::from_properties(props)?.counter)),
            BlockKind::Xor => Behavior::Xor(XorGate),
            BlockKind::Not => Behavior::Inverter(Inverter),
            BlockKind::SrMemory => Behavior::Memory(SrMemory::new(Priority::from_properties(props)?)),
            BlockKind::SrSetPriority => Behavior::Memory(SrMemory::new(Priority::Set)),
            BlockKind::SrResetPriority => Behavior::Memory(SrMemory::new(Priority::Reset)),
            BlockKind::TimerOn => timer(TimerMode::OnDelay, props, clock)?,
            BlockKind::TimerOff => timer(TimerMode::OffDelay, props, clock)?,
            BlockKind::TimerPulse => timer(TimerMode::Pulse, props, clock)?,
        };
        Ok(behavior)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn timer(mode: TimerMode, props: &Properties, clock: &Clock) -> Result<Behavior, PropertyError> {
    let config = DelayConfig::from_properties(props)?;
    Ok(Behavior::Timer(Timer::new(mode, clock.cycles_for(config.delay))))
}

/// Per-kind transition rule and hidden state.
#[derive(Clone, Debug, PartialEq)]
pub enum Behavior {
    Passthrough(Passthrough),
    And(AndGate),
    Or(OrGate),
    Xor(XorGate),
    Inverter(Inverter),
    Memory(SrMemory),
    Timer(Timer),
}

impl Behavior {
    /// Computes the next state from inversion-corrected input levels.
    pub fn evaluate(&mut self, inputs: &[Logic], previous: Logic, clock: &Clock) -> Logic {
        match self {
            Behavior::Passthrough(p) => p.evaluate(inputs, previous),
            Behavior::And(g) => g.evaluate(inputs),
            Behavior::Or(g) => g.evaluate(inputs),
            Behavior::Xor(g) => g.evaluate(inputs),
            Behavior::Inverter(g) => g.evaluate(inputs),
            Behavior::Memory(m) => m.evaluate(inputs, previous),
            Behavior::Timer(t) => t.evaluate(inputs, clock),
        }
    }
}

/// One input of a component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Input {
    /// Driving component, `None` for an unconnected input pin.
    pub source: Option<ComponentId>,
    /// The signal is negated on the way in.
    pub inverted: bool,
    /// The driving pin is the source's complementary output.
    pub complement: bool,
}

impl Input {
    pub fn connected(source: ComponentId, inverted: bool) -> Self {
        Self {
            source: Some(source),
            inverted,
            complement: false,
        }
    }

    pub fn unconnected() -> Self {
        Self {
            source: None,
            inverted: false,
            complement: false,
        }
    }

    /// Marks the input as driven by the source's complementary output.
    pub fn from_complement(mut self, complement: bool) -> Self {
        self.complement = complement;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.source.is_some()
    }

    /// Level seen by this input when its source is in `state`.
    pub fn level(&self, state: Logic) -> Logic {
        state.invert_if(self.complement != self.inverted)
    }
}

/// The running counterpart of one block.
#[derive(Clone, Debug)]
pub struct Component {
    block: BlockId,
    kind: BlockKind,
    state: Logic,
    inputs: Vec<Input>,
    behavior: Behavior,
}

impl Component {
    /// Creates an unwired component with the given power-on state.
    pub fn new(block: BlockId, kind: BlockKind, behavior: Behavior, initial: Logic) -> Self {
        Self {
            block,
            kind,
            state: initial,
            inputs: Vec::new(),
            behavior,
        }
    }

    pub fn block(&self) -> BlockId {
        self.block
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn state(&self) -> Logic {
        self.state
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    /// Appends an input; inputs are read in the order they were added.
    pub fn connect(&mut self, input: Input) {
        self.inputs.push(input);
    }

    /// Overwrites the state, as an external driver would.
    pub fn force(&mut self, value: Logic) {
        self.state = value;
    }

    /// Advances this component by one tick given its input levels.
    pub fn run(&mut self, inputs: &[Logic], clock: &Clock) {
        self.state = self.behavior.evaluate(inputs, self.state, clock);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in BlockKind::ALL {
            assert_eq!(BlockKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(BlockKind::from_name("FLIPFLOP"), None);
    }

    #[test]
    fn test_stateful_kinds() {
        assert!(BlockKind::SrMemory.is_stateful());
        assert!(BlockKind::TimerPulse.is_stateful());
        assert!(!BlockKind::And.is_stateful());
        assert!(!BlockKind::Signal.is_stateful());
    }

    #[test]
    fn test_build_timer_converts_delay() {
        let clock = Clock::new(100);
        let behavior = BlockKind::TimerOff
            .build(&props(&[("Delay", "1"), ("Unit", "s")]), &clock)
            .unwrap();
        match behavior {
            Behavior::Timer(t) => {
                assert_eq!(t.mode, TimerMode::OffDelay);
                assert_eq!(t.delay, 10);
            }
            other => panic!("expected timer, got {other:?}"),
        }
    }

    #[test]
    fn test_build_reports_missing_property() {
        let clock = Clock::default();
        let err = BlockKind::SrMemory.build(&props(&[]), &clock).unwrap_err();
        assert_eq!(err, PropertyError::Missing { key: "Priority".to_string() });
        assert!(BlockKind::SrSetPriority.build(&props(&[]), &clock).is_ok());
    }

    #[test]
    fn test_complement_output_convention() {
        assert!(BlockKind::SrResetPriority.is_complement_output(1));
        assert!(!BlockKind::SrResetPriority.is_complement_output(0));
        assert!(!BlockKind::TimerOn.is_complement_output(1));
        assert_eq!(BlockKind::SrMemory.arity(), Some(2));
        assert_eq!(BlockKind::Output.arity(), Some(1));
        assert_eq!(BlockKind::Or.arity(), None);
    }

    #[test]
    fn test_input_level_combines_polarities() {
        let direct = Input::connected(ComponentId(0), false);
        let complement = direct.from_complement(true);
        let both = Input::connected(ComponentId(0), true).from_complement(true);

        assert_eq!(direct.level(Logic::True), Logic::True);
        assert_eq!(complement.level(Logic::True), Logic::False);
        assert_eq!(both.level(Logic::True), Logic::True);
        assert_eq!(complement.level(Logic::Unknown), Logic::Unknown);
    }

    #[test]
    fn test_component_run_and_force() {
        let clock = Clock::default();
        let mut c = Component::new(BlockId(0), BlockKind::Not, Behavior::Inverter(Inverter), Logic::Unknown);
        c.connect(Input::connected(ComponentId(1), false));
        assert_eq!(c.inputs().len(), 1);

        c.run(&[Logic::True], &clock);
        assert_eq!(c.state(), Logic::False);

        c.force(Logic::True);
        assert_eq!(c.state(), Logic::True);
    }
}
