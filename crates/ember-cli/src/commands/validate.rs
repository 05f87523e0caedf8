//! Effect validation command

use anyhow::{Context, Result};
use ember_particles::{EffectDescription, ParticleRng};

pub fn run(path: &str, format: &str) -> Result<()> {
    let effect = EffectDescription::load(path)
        .with_context(|| format!("Failed to load effect {}", path))?;
    let atlas = effect.atlas();
    let emitter = effect
        .build(&atlas, ParticleRng::new(1))
        .context("Effect failed to build")?;

    let pipeline: Vec<(&str, i32)> = emitter.pipeline().ordered().collect();
    let dynamic = emitter.dynamic_properties().attribute_names();
    let config = emitter.config();

    if format == "json" {
        let behaviours: Vec<serde_json::Value> = pipeline
            .iter()
            .map(|(name, priority)| serde_json::json!({ "name": name, "priority": priority }))
            .collect();
        let output = serde_json::json!({
            "effect": effect.display_name(),
            "capacity": emitter.capacity(),
            "mode": format!("{:?}", config.mode).to_lowercase(),
            "textures": atlas.len(),
            "pipeline": behaviours,
            "dynamic": dynamic,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Effect '{}' is valid", effect.display_name());
    println!("  capacity: {}", emitter.capacity());
    println!("  mode:     {:?}", config.mode);
    println!("  textures: {}", atlas.len());
    if pipeline.is_empty() {
        println!("  pipeline: (empty)");
    } else {
        println!("  pipeline:");
        for (name, priority) in &pipeline {
            println!("    {:>5}  {}", priority, name);
        }
    }
    if dynamic.is_empty() {
        println!("  dynamic:  (none)");
    } else {
        println!("  dynamic:  {}", dynamic.join(", "));
    }
    Ok(())
}
