//! Headless demo: animates a shuffled, spliced list on the virtual DOM and
//! logs where every item appears, frame by frame. A second list is bound
//! through a handle with animations stopped, then started again.
//!
//! ```text
//! RUST_LOG=info auto-animate-demo [options.toml]
//! ```

use std::path::Path;

use auto_animate::{
    AnimateError, AnimateOptions, AutoAnimateDirective, AutoAnimateHandle,
    ElementId, LayoutHost, TickReport, VirtualDom,
};
use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;
use web_time::{Duration, Instant};

const ITEM_COUNT: usize = 6;
const FRAME: Duration = Duration::from_micros(16_667);

fn load_options() -> Result<AnimateOptions, AnimateError> {
    match std::env::args().nth(1) {
        Some(path) => AnimateOptions::load(Path::new(&path)),
        None => Ok(AnimateOptions::default()),
    }
}

fn log_positions(dom: &VirtualDom, container: ElementId, report: &TickReport) {
    let line: Vec<String> = dom
        .children(container)
        .into_iter()
        .chain(dom.held(container))
        .map(|e| {
            let y = dom.visual_rect(e).map_or(f32::NAN, |r| r.y());
            let opacity = dom.visual_opacity(e).unwrap_or(0.0);
            format!("{e}@{y:.1}/{opacity:.2}")
        })
        .collect();
    log::info!("[{} animating] {}", report.animating, line.join(" "));
}

/// Tick at 60fps until nothing is animating.
fn play_out(
    dom: &mut VirtualDom,
    container: ElementId,
    clock: &mut Instant,
    mut tick: impl FnMut(&mut VirtualDom, Instant) -> TickReport,
) {
    loop {
        let report = tick(dom, *clock);
        if let Some(labels) = &report.classification {
            for entry in labels.iter() {
                log::debug!("{} {:?}", entry.element, entry.kind);
            }
        }
        log_positions(dom, container, &report);
        *clock += FRAME;
        if report.is_idle() {
            break;
        }
    }
}

fn fill(dom: &mut VirtualDom, origin: Vec2, rng: &mut impl Rng) -> ElementId {
    let container = dom.create_container(origin);
    for _ in 0..ITEM_COUNT {
        let item = dom.create_element(Vec2::new(200.0, rng.random_range(24.0..48.0)));
        dom.append(container, item);
    }
    container
}

fn exit_on_error<T>(result: Result<T, AnimateError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();

    let directive = exit_on_error(load_options().and_then(AutoAnimateDirective::new));
    let mut dom = VirtualDom::new();
    let mut rng = rand::rng();
    let mut clock = Instant::now();

    // Directive: one configuration applied to a container
    let list = fill(&mut dom, Vec2::ZERO, &mut rng);
    let mut ctrl = exit_on_error(directive.apply(&mut dom, list));

    log::info!("shuffle");
    let mut order = dom.children(list);
    order.shuffle(&mut rng);
    let _ = dom.set_order(list, &order);
    play_out(&mut dom, list, &mut clock, |dom, now| ctrl.tick(dom, now));

    log::info!("remove one, add one");
    let victim = order[rng.random_range(0..order.len())];
    let _ = dom.remove(list, victim);
    let fresh = dom.create_element(Vec2::new(200.0, 32.0));
    dom.insert(list, 0, fresh);
    play_out(&mut dom, list, &mut clock, |dom, now| ctrl.tick(dom, now));

    log::info!("interrupt a move halfway");
    dom.move_to(list, fresh, ITEM_COUNT);
    let _ = ctrl.tick(&mut dom, clock);
    clock += directive.options().duration() / 2;
    dom.move_to(list, fresh, 0);
    play_out(&mut dom, list, &mut clock, |dom, now| ctrl.tick(dom, now));
    ctrl.teardown(&mut dom);

    // Handle: animations toggled off before the container exists
    let mut handle = AutoAnimateHandle::new(directive.options().clone());
    handle.set_enabled(false);
    let list = fill(&mut dom, Vec2::new(240.0, 0.0), &mut rng);
    exit_on_error(handle.bind(&mut dom, list));

    log::info!("stopped: reverse");
    let mut order = dom.children(list);
    order.reverse();
    let _ = dom.set_order(list, &order);
    play_out(&mut dom, list, &mut clock, |dom, now| handle.tick(dom, now));

    log::info!("started: reverse back");
    handle.set_enabled(true);
    order.reverse();
    let _ = dom.set_order(list, &order);
    play_out(&mut dom, list, &mut clock, |dom, now| handle.tick(dom, now));

    handle.unbind(&mut dom);
}
