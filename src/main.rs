use heatsink_rs::discretization::composite::CompositeGrid;
use heatsink_rs::models::heatsink::package::HeatSinkLayout;
use heatsink_rs::numerics::solver::SolverResult;
use heatsink_rs::physics::convection::ConvectionMode;
use heatsink_rs::processing::summary::SimulationSummary;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let scenarios = [
        ("Finned sink", HeatSinkLayout::default(), ConvectionMode::Natural),
        ("Finned sink", HeatSinkLayout::default(), ConvectionMode::Forced),
    ];

    let mut failures = 0;
    for (label, layout, mode) in scenarios {
        let mut composite = match layout.build() {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Invalid layout for {label}: {e}");
                failures += 1;
                continue;
            }
        };

        let result = solve(label, &mut composite, mode);
        let mut summary = SimulationSummary::from_composite(label, mode, &composite);
        match result {
            Some(ref r) => summary.add_solver_info(r),
            None => failures += 1,
        }
        summary.print_to_console();
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn solve(label: &str, composite: &mut CompositeGrid, mode: ConvectionMode) -> Option<SolverResult> {
    println!("Running {label} ({mode:?} convection)...");
    match composite.iterate(mode) {
        Ok(result) => {
            println!("Solver finished successfully.");
            Some(result)
        }
        Err(e) => {
            eprintln!("Solver failed: {}", e);
            None
        }
    }
}
