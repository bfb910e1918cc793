use partsim::core::components::{Behavior, Component, EvalContext, PartBuilder, PortSpec, QueueSpec, Schedule};
use partsim::core::components::schedule::EdgeTrigger;
use partsim::core::errors::SimError;
use partsim::core::execution::{CycleEngine, ExecutionStrategy, SimulationConfig, SimulationEngine};
use partsim::core::values::{Logic, Value, ValueType};
use partsim::core::waveform::{WaveRecord, WaveformSpec};
use partsim::Simulation;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Test component: clock toggling every step, rising on odd steps
struct Clock;

impl Behavior for Clock {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> Result<(), SimError> {
        let level = Logic::from_bool(ctx.step() % 2 == 1);
        ctx.write("clk", level)
    }
}

impl Component for Clock {
    fn ports(&self) -> Vec<PortSpec> {
        vec![PortSpec::output("clk", ValueType::Logic).with_initial(Value::ZERO)]
    }
}

/// Test component: register with synchronous reset
struct Register;

impl Behavior for Register {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> Result<(), SimError> {
        if ctx.read_logic("rst")? == Logic::One {
            ctx.write("out_0", Value::ZERO)
        } else {
            let d = ctx.read("in_0")?;
            ctx.write("out_0", d)
        }
    }
}

impl Component for Register {
    fn ports(&self) -> Vec<PortSpec> {
        vec![
            PortSpec::input("clk", ValueType::Logic),
            PortSpec::input("rst", ValueType::Logic),
            PortSpec::input("in_0", ValueType::Logic),
            PortSpec::output("out_0", ValueType::Logic)
                .with_initial(Value::ZERO)
                .persistent(),
        ]
    }

    fn schedule(&self) -> Schedule {
        Schedule::all_defined(["clk", "rst", "in_0"])
    }

    fn edge(&self) -> Option<EdgeTrigger> {
        Some(EdgeTrigger::rising("clk"))
    }
}

/// Test component: holds reset for cycles 0-4, data toggles every 4 cycles
struct Source {
    cycle: u64,
}

impl Behavior for Source {
    fn evaluate(&mut self, ctx: &mut EvalContext<'_>) -> Result<(), SimError> {
        let cycle = self.cycle;
        self.cycle += 1;
        ctx.write("rst", Logic::from_bool(cycle <= 4))?;
        ctx.write("out_0", Logic::from_bool((cycle / 4) % 2 == 0))
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

fn register_design() -> PartBuilder {
    PartBuilder::new("top")
        .strategy(ExecutionStrategy::Sequential)
        .child(Clock.into_part("clock"))
        .child(Register.into_part("reg"))
        .child(Source { cycle: 0 }.into_part("src"))
        .wire("clock.clk", "reg.clk")
        .wire("clock.clk", "src.clk")
        .wire("src.rst", "reg.rst")
        .wire("src.out_0", "reg.in_0")
}

#[test]
fn test_register_scenario() {
    init_logging();
    let mut engine = Simulation::new(register_design()).unwrap().build().unwrap();

    let mut reg_out = Vec::new();
    let mut src_out = Vec::new();
    // One cycle is a low step followed by a rising step
    for _cycle in 0..10 {
        engine.step().unwrap();
        engine.step().unwrap();
        reg_out.push(engine.port_value("top.reg.out_0").unwrap());
        src_out.push(engine.port_value("top.src.out_0").unwrap());
    }

    for (cycle, value) in reg_out.iter().enumerate().take(5) {
        assert_eq!(*value, Value::ZERO, "cycle {}", cycle);
    }
    for cycle in 5..10 {
        assert_eq!(reg_out[cycle], src_out[cycle - 1], "cycle {}", cycle);
    }
    assert_eq!(reg_out[9], Value::ONE);
}

#[test]
fn test_register_interface_for_codegen() {
    let engine = Simulation::new(register_design()).unwrap().build().unwrap();
    let info = engine.interface("top.reg").unwrap();
    let ports: Vec<(&str, Value)> = info.ports.iter().map(|p| (p.name.as_str(), p.initial)).collect();
    assert_eq!(
        ports,
        vec![("clk", Value::X), ("rst", Value::X), ("in_0", Value::X), ("out_0", Value::ZERO)]
    );
}

fn time_and_signal(signal: impl Fn(u64) -> Value + Send + 'static, times: Vec<i64>) -> PartBuilder {
    let ty = signal(0).value_type();
    PartBuilder::new("top")
        .child(
            PartBuilder::new("time")
                .port(PortSpec::output("t", ValueType::Int))
                .behavior_fn(move |ctx| ctx.write("t", Value::Int(times[ctx.step() as usize % times.len()]))),
        )
        .child(
            PartBuilder::new("sig")
                .port(PortSpec::output("y", ty))
                .behavior_fn(move |ctx| ctx.write("y", signal(ctx.step()))),
        )
}

fn records(engine: &CycleEngine) -> Vec<(u64, Value)> {
    engine.records().into_iter().map(|r| (r.time, r.value)).collect()
}

#[test]
fn test_waveform_emits_initial_then_changes() {
    init_logging();
    let top = time_and_signal(|step| Value::bit(step >= 2), vec![0, 1, 2, 3]);
    let mut sim = Simulation::new(top).unwrap();
    sim.monitor(WaveformSpec::new("top.time.t").signal("sig", "top.sig.y")).unwrap();
    let mut engine = sim.build().unwrap();

    // Time reference undefined before the first step
    assert!(engine.records().is_empty());
    for _ in 0..4 {
        engine.step().unwrap();
    }
    assert_eq!(records(&engine), vec![(0, Value::ZERO), (2, Value::ONE)]);
    let sig: Vec<&WaveRecord> = engine.monitors()[0].records_for("sig").collect();
    assert_eq!(sig.len(), 2);
}

#[test]
fn test_waveform_drops_backwards_time() {
    let top = time_and_signal(|step| Value::Int(step as i64), vec![0, 5, 3, 6]);
    let mut sim = Simulation::new(top).unwrap();
    sim.monitor(WaveformSpec::new("top.time.t").signal("n", "top.sig.y")).unwrap();
    let mut engine = sim.build().unwrap();
    for _ in 0..4 {
        engine.step().unwrap();
    }
    assert_eq!(
        records(&engine),
        vec![(0, Value::Int(0)), (5, Value::Int(1)), (6, Value::Int(3))]
    );
}

#[test]
fn test_waveform_vcd_file() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wave.vcd");

    let top = time_and_signal(|step| Value::bit(step >= 2), vec![0, 1, 2, 3]);
    let mut sim = Simulation::new(top).unwrap();
    sim.monitor(
        WaveformSpec::new("top.time.t")
            .signal("sig", "top.sig.y")
            .signal("time", "top.time.t")
            .timescale("10ns")
            .to_file(&path),
    )
    .unwrap();
    let mut engine = SimulationEngine::new(sim.build().unwrap(), Some(4));
    engine.run().unwrap();
    engine.finish().unwrap();

    let vcd = std::fs::read_to_string(&path).unwrap();
    assert!(vcd.contains("$timescale"));
    assert!(vcd.contains("$var wire 1 ! sig $end"));
    assert!(vcd.contains("$var wire 64 \" time $end"));
    assert!(vcd.contains("$dumpvars"));
    assert!(vcd.contains("0!"));
    assert!(vcd.contains("1!"));
    assert!(vcd.contains("b10 \""));
    let dump = vcd.find("$dumpvars").unwrap();
    let first_change = vcd.find("#1").unwrap();
    let rise = vcd.find("#2").unwrap();
    assert!(dump < first_change && first_change < rise);
}

#[test]
fn test_waveform_file_only_keeps_no_records() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stream.vcd");

    let top = time_and_signal(|step| Value::bit(step % 2 == 1), vec![0, 1, 2, 3]);
    let mut sim = Simulation::new(top).unwrap();
    sim.monitor(
        WaveformSpec::new("top.time.t")
            .signal("sig", "top.sig.y")
            .to_file(&path)
            .without_records(),
    )
    .unwrap();
    let mut engine = sim.build().unwrap();
    for _ in 0..4 {
        engine.step().unwrap();
    }
    assert!(engine.records().is_empty());
    engine.finish().unwrap();

    let vcd = std::fs::read_to_string(&path).unwrap();
    assert!(vcd.contains("$dumpvars"));
    assert!(vcd.contains("#3"));
}

#[test]
fn test_skipped_steps_keep_outputs_randomized() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let enables: Vec<bool> = (0..200).map(|_| rng.gen_bool(0.5)).collect();
    let values: Vec<i64> = (0..200).map(|_| rng.gen_range(-1000..1000)).collect();

    let driver_enables = enables.clone();
    let driver = PartBuilder::new("drv")
        .port(PortSpec::output("en", ValueType::Logic))
        .behavior_fn(move |ctx| ctx.write("en", Value::bit(driver_enables[ctx.step() as usize])));

    let gated_values = values.clone();
    let gated = PartBuilder::new("gated")
        .port(PortSpec::input("en", ValueType::Logic))
        .port(PortSpec::output("word", ValueType::Int))
        .port(PortSpec::output("flag", ValueType::Logic).with_initial(Value::ZERO).transient())
        .schedule(Schedule::from_fn(["en"], |inputs| {
            inputs.value("en").map_or(false, |v| v.is_asserted())
        }))
        .behavior_fn(move |ctx| {
            let value = gated_values[ctx.step() as usize];
            ctx.write("word", Value::Int(value))?;
            if value % 2 == 0 {
                ctx.write("flag", Value::ONE)?;
            }
            Ok(())
        });

    let top = PartBuilder::new("top").child(driver).child(gated).wire("drv.en", "gated.en");
    let mut engine = Simulation::new(top).unwrap().build().unwrap();

    let snapshot = |engine: &CycleEngine| {
        (
            engine.port_value("top.gated.word").unwrap(),
            engine.port_value("top.gated.flag").unwrap(),
        )
    };
    let mut previous = snapshot(&engine);
    for step in 0..200 {
        engine.step().unwrap();
        let current = snapshot(&engine);
        if enables[step] {
            assert_eq!(current.0, Value::Int(values[step]));
            assert_eq!(current.1, Value::bit(values[step] % 2 == 0));
        } else {
            assert_eq!(current, previous, "step {}", step);
        }
        previous = current;
    }
}

/// Independent children: the strategy must not change the outcome
fn independent_design(strategy: ExecutionStrategy) -> PartBuilder {
    let mut top = PartBuilder::new("top").strategy(strategy);
    for index in 0..8i64 {
        let mut acc = 0i64;
        top = top.child(
            PartBuilder::new(&format!("acc{}", index))
                .port(PortSpec::output("sum", ValueType::Int))
                .behavior_fn(move |ctx| {
                    acc += index * ctx.step() as i64;
                    ctx.write("sum", Value::Int(acc))
                }),
        );
    }
    top
}

#[test]
fn test_concurrent_matches_sequential_for_independent_children() {
    let config = SimulationConfig::new().with_thread_pool_size(4);
    let mut concurrent = Simulation::with_config(independent_design(ExecutionStrategy::Concurrent), config)
        .unwrap()
        .build()
        .unwrap();
    let mut sequential = Simulation::new(independent_design(ExecutionStrategy::Sequential))
        .unwrap()
        .build()
        .unwrap();

    for _ in 0..20 {
        concurrent.step().unwrap();
        sequential.step().unwrap();
    }
    for index in 0..8 {
        let path = format!("top.acc{}.sum", index);
        assert_eq!(concurrent.port_value(&path).unwrap(), sequential.port_value(&path).unwrap());
    }
}

fn summing_consumer(capacity: usize) -> PartBuilder {
    PartBuilder::new("top").child(
        PartBuilder::new("sum")
            .queue(QueueSpec::input("q", ValueType::Int, capacity))
            .port(PortSpec::output("total", ValueType::Int).with_initial(Value::Int(0)))
            .schedule(Schedule::queue_pending(["q"]))
            .behavior_fn(|ctx| {
                let total = ctx.read("total")?.as_i64().unwrap_or(0);
                let value = ctx.event("q")?.and_then(|e| e.value.as_i64()).unwrap_or(0);
                ctx.write("total", Value::Int(total + value))
            }),
    )
}

#[test]
fn test_queue_overflow_is_recoverable() {
    let mut engine = Simulation::new(summing_consumer(2)).unwrap().build().unwrap();
    let queue = engine.queue("top.sum.q").unwrap();

    queue.enqueue(Value::Int(1), 0).unwrap();
    queue.enqueue(Value::Int(2), 0).unwrap();
    let err = queue.enqueue(Value::Int(4), 0).unwrap_err();
    assert!(matches!(err, SimError::Overflow { capacity: 2, .. }));
    assert!(!err.is_fatal());
    assert_eq!(queue.len(), 2);

    assert!(matches!(
        queue.enqueue(Value::ONE, 0),
        Err(SimError::QueueTypeMismatch { .. })
    ));

    for _ in 0..3 {
        engine.step().unwrap();
    }
    assert_eq!(engine.port_value("top.sum.total").unwrap(), Value::Int(3));
}

#[test]
fn test_queue_producer_thread() {
    init_logging();
    let mut engine = Simulation::new(summing_consumer(64)).unwrap().build().unwrap();
    let queue = engine.queue("top.sum.q").unwrap();

    let producer = std::thread::spawn(move || {
        for value in 1..=50i64 {
            queue.enqueue(Value::Int(value), value as u64).unwrap();
        }
    });

    for _ in 0..20 {
        engine.step().unwrap();
    }
    producer.join().unwrap();
    for _ in 0..50 {
        engine.step().unwrap();
    }
    assert_eq!(engine.port_value("top.sum.total").unwrap(), Value::Int(1275));
}
