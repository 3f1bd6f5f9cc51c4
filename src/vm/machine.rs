//! The machine: shared state plus context scheduling.
//!
//! One `Machine` holds the register file, list store and output collector
//! for a run. The main context always starts at PC 0. In fan-out mode, once
//! main halts cleanly, one context per declared function starts at that
//! function's entry and all of them share the same registers and lists.
//! Register writes between those contexts are unsynchronized: the last
//! writer wins and the order is unspecified.

use tracing::{info, instrument, warn};

use crate::assembler::{Assembler, Assembly, Program, SymbolicInstr};
use crate::config::{ExecutionMode, VmConfig};
use crate::core::{
    ContextId, ListStore, OutputCollector, OutputEntry, OutputValue, RegisterFile, VmError,
    VmResult, Word,
};
use crate::runtime::{format_line, resolve, PreloadSource, PreloadSummary};
use super::executor::{Context, ContextReport, Shared};

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Main first, then fan-out contexts in ascending function id.
    pub contexts: Vec<ContextReport>,
    /// Drained outputs, grouped by output id.
    pub outputs: Vec<OutputEntry>,
}

impl RunReport {
    pub fn main(&self) -> Option<&ContextReport> {
        self.contexts.iter().find(|c| c.context == ContextId::Main)
    }

    pub fn context(&self, id: ContextId) -> Option<&ContextReport> {
        self.contexts.iter().find(|c| c.context == id)
    }

    /// True when every context halted without a fault.
    pub fn is_clean(&self) -> bool {
        self.contexts.iter().all(|c| c.status.is_halted())
    }

    pub fn faults(&self) -> impl Iterator<Item = (ContextId, &VmError)> {
        self.contexts
            .iter()
            .filter_map(|c| c.status.fault().map(|e| (c.context, e)))
    }

    /// Payloads collected under one output id, in collection order.
    pub fn values(&self, id: u32) -> Vec<&OutputValue> {
        self.outputs.iter().filter(|e| e.id == id).map(|e| &e.value).collect()
    }

    pub fn total_instructions(&self) -> u64 {
        self.contexts.iter().map(|c| c.instructions).sum()
    }

    /// Text sink rendering of the outputs.
    pub fn to_text(&self) -> String {
        self.outputs.iter().map(|e| format_line(e) + "\n").collect()
    }
}

/// The tcscl virtual machine.
#[derive(Debug, Default)]
pub struct Machine {
    config: VmConfig,
    registers: RegisterFile,
    lists: ListStore,
    output: OutputCollector,
}

impl Machine {
    pub fn new(config: VmConfig) -> Self {
        Self {
            config,
            registers: RegisterFile::new(),
            lists: ListStore::new(),
            output: OutputCollector::new(),
        }
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn lists(&self) -> &ListStore {
        &self.lists
    }

    pub fn register(&self, index: usize) -> Option<Word> {
        self.registers.get(index)
    }

    /// Current contents of a declared list.
    pub fn list(&self, id: u32) -> Option<Vec<f32>> {
        self.lists.snapshot(id)
    }

    /// Apply the assembler's preload side table. Must happen before `run`.
    pub fn preload(&self, assembly: &Assembly, source: &PreloadSource) -> PreloadSummary {
        resolve(&self.lists, &assembly.preloads, source)
    }

    /// Clear registers, lists and pending outputs for a fresh run.
    pub fn reset(&mut self) {
        self.registers.clear();
        self.lists = ListStore::new();
        self.output.drain();
    }

    fn shared(&self) -> Shared<'_> {
        Shared {
            registers: &self.registers,
            lists: &self.lists,
            output: &self.output,
        }
    }

    fn context<'a>(&'a self, id: ContextId, program: &'a Program, entry: u32) -> Context<'a> {
        Context::new(id, program, self.shared(), entry, self.config.seed)
            .with_instruction_limit(self.config.max_instructions)
    }

    /// Execute `program` and drain its outputs.
    ///
    /// Faults end only the context that raised them; outputs it produced
    /// before faulting are kept.
    #[instrument(skip_all, fields(words = program.len(), mode = ?self.config.mode))]
    pub fn run(&self, program: &Program) -> RunReport {
        let main = self.context(ContextId::Main, program, 0).run();
        info!(
            instructions = main.instructions,
            halted = main.status.is_halted(),
            "main context finished"
        );

        let mut contexts = vec![main];
        if self.config.mode == ExecutionMode::FanOut {
            if contexts[0].status.is_halted() {
                contexts.extend(self.fan_out(program));
            } else {
                warn!("main context faulted, fan-out skipped");
            }
        }

        let report = RunReport {
            contexts,
            outputs: self.output.drain(),
        };
        info!(
            contexts = report.contexts.len(),
            outputs = report.outputs.len(),
            instructions = report.total_instructions(),
            "run finished"
        );
        report
    }

    /// One context per declared function, ascending by id.
    fn fan_out(&self, program: &Program) -> Vec<ContextReport> {
        let entries: Vec<(u32, u32)> = program.functions().iter().map(|(&id, &pc)| (id, pc)).collect();
        let spawn = |&(id, entry): &(u32, u32)| self.context(ContextId::Function(id), program, entry).run();

        info!(
            contexts = entries.len(),
            parallel = self.config.runs_in_parallel(),
            "fan-out started"
        );

        #[cfg(feature = "parallel")]
        {
            if self.config.runs_in_parallel() {
                use rayon::prelude::*;
                return entries.par_iter().map(spawn).collect();
            }
        }

        entries.iter().map(spawn).collect()
    }
}

/// Assemble, parse the preload text, preload and run in one call.
pub fn run_symbolic(instrs: &[SymbolicInstr], preload_text: &str, config: VmConfig) -> VmResult<RunReport> {
    let assembly = Assembler::new().assemble(instrs)?;
    let source = PreloadSource::parse(preload_text)?;
    let machine = Machine::new(config);
    machine.preload(&assembly, &source);
    Ok(machine.run(&assembly.program))
}
