use agents::config::{RunConfig, CONFIG_ENV};
use agents::environments::grid_mdp::{GridMdp, GridState};
use agents::environments::grid_view::GridView;
use agents::mdps::mdp_simulator::{discounted_return, rollout};
use agents::tracking::{
    GreedyControl, InferenceModule, StaticBelief, TracingDisplay, TrackingAgent,
};
use agents::{GreedyPursuit, MdpSolver, MdpSolverPolicy, ValueIteration};
use anyhow::{anyhow, Context, Result};
use gridworld::{render, Cell, Direction, Distancer, Layout};
use rand::prelude::*;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("agents=info")),
        )
        .init();

    let config = load_config()?;
    info!(?config, "starting");

    let mdp = Rc::new(config.mdp().context("building the grid MDP")?);
    let vi = match config.theta {
        Some(theta) => ValueIteration::until_converged(
            Rc::clone(&mdp),
            config.discount,
            theta,
            config.iterations,
        ),
        None => ValueIteration::new(Rc::clone(&mdp), config.discount, config.iterations),
    };
    let vi = Rc::new(vi.context("running value iteration")?);

    println!(
        "Grid: {}, iterations: {}, residual: {:.2e}",
        config.grid,
        vi.iterations(),
        vi.residual()
    );
    println!(
        "Values:\n{}",
        render::values_text(mdp.layout(), |c| vi.v_star(&GridState::Cell(c)))
    );
    println!("Policy:\n{}", mdp.policy_text(|s| vi.pi_star(s)));

    run_episodes(&config, &mdp, Rc::clone(&vi))?;
    run_pursuit(&config, mdp.layout().clone())
}

fn load_config() -> Result<RunConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .map(PathBuf::from);

    let config = match path {
        Some(path) => {
            RunConfig::load(&path).with_context(|| format!("loading {}", path.display()))?
        }
        None => RunConfig::default(),
    };
    let config = config
        .apply_overrides(|k| std::env::var(k).ok())
        .context("reading AGENTS_* overrides")?
        .resolve_tuning()?;
    config.validate().context("validating config")?;

    Ok(config)
}

fn run_episodes(
    config: &RunConfig,
    mdp: &GridMdp,
    vi: Rc<ValueIteration<GridMdp>>,
) -> Result<()> {
    let start = mdp
        .start_state()
        .ok_or_else(|| anyhow!("grid {} has no start cell", config.grid))?;
    let expected = vi.v_star(&start);
    let policy = MdpSolverPolicy { mdp_solver: vi };

    let rng = &mut StdRng::seed_from_u64(config.seed);
    let mut total = 0.;
    for i in 0..config.episodes {
        let episode = rollout(mdp, &policy, start, config.max_steps, rng)
            .with_context(|| format!("episode {i}"))?;
        let g = discounted_return(&episode, config.discount);
        println!("Episode {i}: {} steps, return {g:.3}", episode.len());
        total += g;
    }

    if config.episodes > 0 {
        println!(
            "Average return {:.3} over {} episodes, V(start) = {expected:.3}",
            total / config.episodes as f64,
            config.episodes
        );
    }

    Ok(())
}

/// Chases a target parked on every exit cell of the grid.
fn run_pursuit(config: &RunConfig, layout: Layout) -> Result<()> {
    let targets = layout
        .open_cells()
        .into_iter()
        .filter(|c| layout.exit_reward(*c).is_some())
        .collect::<Vec<_>>();
    let pursuer = layout
        .start()
        .ok_or_else(|| anyhow!("grid {} has no start cell", config.grid))?;

    let distancer = Distancer::new(&layout);
    let layout = Rc::new(layout);
    let mut view = GridView::new(Rc::clone(&layout), pursuer, targets.clone());

    let modules = targets
        .iter()
        .map(|t| Box::new(StaticBelief::point(*t)) as Box<dyn InferenceModule<GridView>>)
        .collect();
    let successor = |c: &Cell, d: &Direction| d.successor(*c);
    let control = GreedyControl::new(
        GreedyPursuit::new(distancer, successor),
        Direction::Stop,
    );
    let mut agent = TrackingAgent::new(modules, control, TracingDisplay);
    agent.register_initial_state(&view);

    let mut steps = 0;
    while !view.is_cleared() && steps < config.max_steps {
        let d = agent.get_action(&view);
        view.apply(d);
        steps += 1;
    }

    println!(
        "Pursuit: {} of {} targets captured in {steps} steps",
        view.captured(),
        targets.len()
    );

    Ok(())
}
