use skycast_core::app::App;
use skycast_core::model::{ForecastEntry, UnitSystem, WeatherSnapshot};

/// Print the current app state: error and loading lines, then the snapshot
/// and forecast, or the empty-state hint when there is nothing to show.
pub fn report(app: &App) {
    if let Some(message) = app.active_error() {
        println!("! {message}");
    }
    if app.is_loading() {
        println!("Loading...");
    }
    if app.show_empty_state() {
        println!("Start with a city or your current location. Try London, Tokyo or New York.");
        return;
    }

    if let Some(snapshot) = app.weather().snapshot() {
        print_current(&snapshot);
    }

    let forecast = app.weather().forecast();
    if !forecast.is_empty() {
        print_forecast(&forecast, app.unit());
    }
}

fn print_current(snapshot: &WeatherSnapshot) {
    let unit = snapshot.unit;
    println!("{} — {}", snapshot.location_name, snapshot.condition);
    println!(
        "  {:.1}{} (feels like {:.1}{})",
        snapshot.temperature,
        unit.temperature_suffix(),
        snapshot.feels_like,
        unit.temperature_suffix(),
    );
    println!(
        "  humidity {}%  wind {:.1} {}",
        snapshot.humidity_pct,
        snapshot.wind_speed,
        unit.wind_suffix(),
    );
    println!("  observed {}", snapshot.observed_at.format("%H:%M UTC"));
}

fn print_forecast(entries: &[ForecastEntry], unit: UnitSystem) {
    println!("5-day outlook:");
    for entry in entries {
        println!(
            "  {}  {:>6.1}{}  {}",
            entry.at.format("%a %d %b"),
            entry.temperature,
            unit.temperature_suffix(),
            entry.condition,
        );
    }
}

pub fn print_history(entries: &[String]) {
    println!("Recent searches:");
    for (index, term) in entries.iter().enumerate() {
        println!("  {}. {}", index + 1, term);
    }
}
