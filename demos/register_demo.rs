use log::info;
use partsim::core::components::{Behavior, Component, EdgeTrigger, EvalContext, PartBuilder, PortSpec, Schedule};
use partsim::core::execution::{ExecutionStrategy, SimulationConfig};
use partsim::core::values::{Logic, Value, ValueType};
use partsim::core::waveform::WaveformSpec;
use partsim::{SimError, Simulation};

struct Clock;

impl Behavior for Clock {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> Result<(), SimError> {
        ctx.write("clk", Logic::from_bool(ctx.step() % 2 == 1))?;
        ctx.write("time", Value::Int(ctx.step() as i64))
    }
}

impl Component for Clock {
    fn ports(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::output("clk", ValueType::Logic).with_initial(Value::ZERO),
            PortSpec::output("time", ValueType::Int),
        ]
    }
}

struct Register;

impl Behavior for Register {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> Result<(), SimError> {
        let next = match ctx.read_logic("rst")? {
            Logic::One => Value::ZERO,
            _ => ctx.read("in_0")?,
        };
        ctx.write("out_0", next)
    }
}

impl Component for Register {
    fn ports(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::input("clk", ValueType::Logic),
            PortSpec::input("rst", ValueType::Logic),
            PortSpec::input("in_0", ValueType::Logic),
            PortSpec::output("out_0", ValueType::Logic).with_initial(Value::ZERO),
        ]
    }

    fn schedule(&self) -> Schedule {
        Schedule::all_defined(["clk", "rst", "in_0"])
    }

    fn edge(&self) -> Option<EdgeTrigger> {
        Some(EdgeTrigger::rising("clk"))
    }
}

/// Reset for the first five cycles, then a pattern toggling every four
struct Source {
    cycle: u64,
}

impl Behavior for Source {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> Result<(), SimError> {
        ctx.write("rst", Logic::from_bool(self.cycle <= 4))?;
        ctx.write("out_0", Logic::from_bool((self.cycle / 4) % 2 == 0))?;
        self.cycle += 1;
        Ok(())
    }
}

impl Component for Source {
    fn ports(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::input("clk", ValueType::Logic),
            PortSpec::output("rst", ValueType::Logic),
            PortSpec::output("out_0", ValueType::Logic),
        ]
    }

    fn edge(&self) -> Option<EdgeTrigger> {
        Some(EdgeTrigger::rising("clk"))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    let output = std::env::args().nth(1).unwrap_or_else(|| "register.vcd".to_string());
    let cycles = 10;

    let top = PartBuilder::new("top")
        .child(Clock.into_part("clock"))
        .child(Register.into_part("reg"))
        .child(Source { cycle: 0 }.into_part("src"))
        .wire("clock.clk", "reg.clk")
        .wire("clock.clk", "src.clk")
        .wire("src.rst", "reg.rst")
        .wire("src.out_0", "reg.in_0");

    let config = SimulationConfig::new()
        .with_strategy(ExecutionStrategy::Sequential)
        .with_max_steps(2 * cycles);
    let mut sim = Simulation::with_config(top, config)?;
    sim.monitor(
        WaveformSpec::new("top.clock.time")
            .signal("clk", "top.clock.clk")
            .signal("rst", "top.src.rst")
            .signal("src_out", "top.src.out_0")
            .signal("reg_out", "top.reg.out_0")
            .to_file(&output),
    )?;

    let mut engine = sim.build_engine()?;
    let steps = engine.run()?;
    let cycle_engine = engine.finish()?;

    println!("Simulated {} cycles ({} steps)", cycles, steps);
    for record in cycle_engine.monitors()[0].records_for("reg_out") {
        println!("  t={:<3} reg_out={}", record.time, record.value);
    }
    info!("Waveform written to {}", output);
    Ok(())
}
