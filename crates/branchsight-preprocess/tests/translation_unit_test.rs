//! End-to-end test driving a realistic translation unit through the full
//! pipeline: clean, expand, enumerate, and select every variant.

use branchsight_preprocess::{select_configuration, Preprocessor};

const DRIVER_SOURCE: &str = r#"/*
 * Probe path for a fictional platform device.
 */
#include <linux/module.h>

#define RETRIES 3
#define REG_WRITE(reg, val) writel(val, base + reg)

static int hw_init(void __iomem *base)
{
    int tries = RETRIES;   /* bounded spin */
    REG_WRITE(0x10, 1);
#ifdef CONFIG_DEBUG
    pr_info("hw_init: %d tries left\n", tries); // noisy
#endif
#if defined(CONFIG_PM)
    pm_runtime_enable(base);
#ifdef CONFIG_PM_SLEEP
    device_wakeup_enable(base);
#endif
#else
    legacy_power_on(base);
#endif
    return tries;
}
"#;

#[test]
fn test_driver_configurations() {
    let result = Preprocessor::new()
        .preprocess_split(DRIVER_SOURCE.as_bytes())
        .unwrap();

    assert_eq!(
        result.configurations,
        vec!["", "CONFIG_DEBUG", "CONFIG_PM", "CONFIG_PM;CONFIG_PM_SLEEP"]
    );
}

#[test]
fn test_driver_macros_expanded() {
    let result = Preprocessor::new()
        .preprocess_split(DRIVER_SOURCE.as_bytes())
        .unwrap();

    assert!(result.code.contains("int tries = 3;"));
    // Bodies are rebuilt from tokens: only name-name adjacency is spaced,
    // and argument text is substituted verbatim.
    assert!(result.code.contains("writel( 1,base+0x10);"));
    assert!(!result.code.contains("#define"));
}

#[test]
fn test_driver_variant_contents() {
    let pp = Preprocessor::new();
    let variants = pp.preprocess(DRIVER_SOURCE.as_bytes()).unwrap();

    // The unguarded variant takes the #else branch of the PM chain.
    let base = &variants[""];
    assert!(base.contains("legacy_power_on(base);"));
    assert!(!base.contains("pm_runtime_enable"));
    assert!(!base.contains("pr_info"));

    let pm = &variants["CONFIG_PM"];
    assert!(pm.contains("pm_runtime_enable(base);"));
    assert!(!pm.contains("device_wakeup_enable"));
    assert!(!pm.contains("legacy_power_on"));

    let pm_sleep = &variants["CONFIG_PM;CONFIG_PM_SLEEP"];
    assert!(pm_sleep.contains("pm_runtime_enable(base);"));
    assert!(pm_sleep.contains("device_wakeup_enable(base);"));

    let debug = &variants["CONFIG_DEBUG"];
    assert!(debug.contains("pr_info"));
}

#[test]
fn test_driver_line_numbering_stable() {
    let pp = Preprocessor::new();
    let result = pp.preprocess_split(DRIVER_SOURCE.as_bytes()).unwrap();
    let source_lines = DRIVER_SOURCE.matches('\n').count();

    assert_eq!(result.code.matches('\n').count(), source_lines);
    for cfg in &result.configurations {
        let variant = select_configuration(&result.code, cfg);
        assert_eq!(variant.matches('\n').count(), source_lines, "cfg {:?}", cfg);
    }
}

#[test]
fn test_driver_include_survives_selection() {
    let pp = Preprocessor::new();
    let variants = pp.preprocess(DRIVER_SOURCE.as_bytes()).unwrap();
    for (cfg, variant) in &variants {
        assert!(
            variant.contains("#include <linux/module.h>"),
            "missing include under {:?}",
            cfg
        );
    }
}
