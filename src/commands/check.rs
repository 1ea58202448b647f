//! Check command implementation.
//!
//! Validates system requirements and configuration.

use pidinfo::process::collect_proc_entries;
use pidinfo::system::{clock_ticks_per_second, platform_clock_ticks};
use pidinfo::{ProcFs, Resolver};

use crate::config::{validate_effective_config, Config};
use crate::startup_checks;

/// Validates system requirements and configuration.
pub async fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 pidinfo - System Check");
    println!("=========================");

    let mut all_ok = true;
    let procfs = ProcFs::default();

    // Check /proc filesystem
    println!("\n📁 Checking /proc filesystem...");
    match startup_checks::validate_requirements(&procfs) {
        Ok(()) => {
            let entries = collect_proc_entries(procfs.root(), Some(5));
            println!("   ✅ /proc counters readable ({} process entries sampled)", entries.len());
        }
        Err(e) => {
            println!("   ❌ {}", e);
            println!("   ⚠️  CPU and memory of reduced listings will be reported as 0");
            all_ok = false;
        }
    }

    // Clock resolution
    println!("\n⏱️  Checking clock resolution...");
    let settings = config.resolver_settings();
    let effective = clock_ticks_per_second(settings.clock_tick_override);
    match (settings.clock_tick_override, platform_clock_ticks()) {
        (Some(rate), _) => println!("   ✅ {} ticks/s (operator override)", rate),
        (None, Some(rate)) => println!("   ✅ {} ticks/s (reported by platform)", rate),
        (None, None) => println!("   ⚠️  Platform did not report a rate, using {} ticks/s", effective),
    }

    // Listing variant, probed with our own pid
    println!("\n📋 Checking `{}` listing support...", settings.ps_command);
    let resolver = Resolver::new(settings);
    match resolver.resolve(std::process::id()).await {
        Ok(record) => {
            println!("   ✅ {} listing works", record.source);
            println!(
                "   ✅ Own process: user={} cpu={:.1}% mem={:.1}% etime={}",
                record.user, record.cpu_percent, record.mem_percent, record.elapsed
            );
        }
        Err(e) => {
            println!("   ❌ Lookup of own process failed: {}", e);
            all_ok = false;
        }
    }

    // Check configuration
    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => {
            println!("   ✅ Configuration is valid");
        }
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}
