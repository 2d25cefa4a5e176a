//! Configuration validation.
//!
//! Validates all config fields before a backtest runs, so a bad file fails
//! up front instead of mid-simulation.

use crate::domain::error::BarsimError;
use crate::domain::metrics::Frequency;
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BarsimError> {
    validate_initial_cash(config)?;
    validate_slippage(config)?;
    validate_commission(config)?;
    validate_risk_free_rate(config)?;
    validate_frequency(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), BarsimError> {
    match strategy_name(config)?.as_str() {
        "sma_crossover" => validate_sma_crossover(config),
        "mean_reversion" => validate_mean_reversion(config),
        other => Err(BarsimError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "name".to_string(),
            reason: format!("unknown strategy '{other}'"),
        }),
    }
}

fn strategy_name(config: &dyn ConfigPort) -> Result<String, BarsimError> {
    match config.get_string("strategy", "name") {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(BarsimError::ConfigMissing {
            section: "strategy".to_string(),
            key: "name".to_string(),
        }),
    }
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), BarsimError> {
    let value = config.get_double("backtest", "initial_cash", 0.0);
    if value <= 0.0 {
        return Err(BarsimError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_cash".to_string(),
            reason: "initial_cash must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_slippage(config: &dyn ConfigPort) -> Result<(), BarsimError> {
    let value = config.get_double("backtest", "slippage_bps", 0.0);
    if value < 0.0 {
        return Err(BarsimError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "slippage_bps".to_string(),
            reason: "slippage_bps must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort) -> Result<(), BarsimError> {
    let value = config.get_double("backtest", "commission_bps", 0.0);
    if value < 0.0 {
        return Err(BarsimError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "commission_bps".to_string(),
            reason: "commission_bps must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), BarsimError> {
    let value = config.get_double("backtest", "risk_free_rate", 0.0);
    if value < 0.0 || value >= 1.0 {
        return Err(BarsimError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "risk_free_rate".to_string(),
            reason: "risk_free_rate must be between 0 and 1".to_string(),
        });
    }
    Ok(())
}

fn validate_frequency(config: &dyn ConfigPort) -> Result<(), BarsimError> {
    if let Some(s) = config.get_string("backtest", "frequency") {
        Frequency::parse(&s)?;
    }
    Ok(())
}

fn validate_size_pct(config: &dyn ConfigPort) -> Result<(), BarsimError> {
    let value = config.get_double("strategy", "size_pct", 0.0);
    if value <= 0.0 || value > 1.0 {
        return Err(BarsimError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "size_pct".to_string(),
            reason: "size_pct must be between 0 and 1".to_string(),
        });
    }
    Ok(())
}

fn validate_cooldown(config: &dyn ConfigPort) -> Result<(), BarsimError> {
    let value = config.get_int("strategy", "cooldown", 0);
    if value < 0 {
        return Err(BarsimError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "cooldown".to_string(),
            reason: "cooldown must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_sma_crossover(config: &dyn ConfigPort) -> Result<(), BarsimError> {
    let fast = config.get_int("strategy", "fast", 0);
    if fast < 1 {
        return Err(BarsimError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "fast".to_string(),
            reason: "fast window must be at least 1".to_string(),
        });
    }
    let slow = config.get_int("strategy", "slow", 0);
    if slow <= fast {
        return Err(BarsimError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "slow".to_string(),
            reason: "slow window must be greater than fast".to_string(),
        });
    }
    validate_size_pct(config)?;
    validate_cooldown(config)?;
    Ok(())
}

fn validate_mean_reversion(config: &dyn ConfigPort) -> Result<(), BarsimError> {
    let window = config.get_int("strategy", "window", 0);
    if window < 2 {
        return Err(BarsimError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "window".to_string(),
            reason: "window must be at least 2".to_string(),
        });
    }
    let exit_z = config.get_double("strategy", "exit_z", 0.5);
    if exit_z < 0.0 {
        return Err(BarsimError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "exit_z".to_string(),
            reason: "exit_z must be non-negative".to_string(),
        });
    }
    let entry_z = config.get_double("strategy", "entry_z", 0.0);
    if entry_z <= exit_z {
        return Err(BarsimError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "entry_z".to_string(),
            reason: "entry_z must be greater than exit_z".to_string(),
        });
    }
    for key in ["stop_pct", "tp_pct"] {
        let value = config.get_double("strategy", key, 0.0);
        if value < 0.0 {
            return Err(BarsimError::ConfigInvalid {
                section: "strategy".to_string(),
                key: key.to_string(),
                reason: format!("{key} must be non-negative"),
            });
        }
    }
    validate_size_pct(config)?;
    validate_cooldown(config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_backtest_config_passes() {
        let config = make_config(
            r#"
[backtest]
initial_cash = 100000.0
slippage_bps = 1.0
commission_bps = 0.5
risk_free_rate = 0.02
frequency = daily
"#,
        );
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn initial_cash_must_be_positive() {
        let config = make_config("[backtest]\ninitial_cash = -100\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BarsimError::ConfigInvalid { key, .. } if key == "initial_cash"));
    }

    #[test]
    fn initial_cash_zero_fails() {
        let config = make_config("[backtest]\ninitial_cash = 0\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BarsimError::ConfigInvalid { key, .. } if key == "initial_cash"));
    }

    #[test]
    fn slippage_negative_fails() {
        let config = make_config("[backtest]\ninitial_cash = 100\nslippage_bps = -1\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BarsimError::ConfigInvalid { key, .. } if key == "slippage_bps"));
    }

    #[test]
    fn commission_negative_fails() {
        let config = make_config("[backtest]\ninitial_cash = 100\ncommission_bps = -0.5\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BarsimError::ConfigInvalid { key, .. } if key == "commission_bps"));
    }

    #[test]
    fn risk_free_rate_out_of_range_fails() {
        let config = make_config("[backtest]\ninitial_cash = 100\nrisk_free_rate = 1.5\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BarsimError::ConfigInvalid { key, .. } if key == "risk_free_rate"));
    }

    #[test]
    fn unknown_frequency_fails() {
        let config = make_config("[backtest]\ninitial_cash = 100\nfrequency = weekly\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BarsimError::ConfigInvalid { key, .. } if key == "frequency"));
    }

    #[test]
    fn missing_frequency_is_fine() {
        let config = make_config("[backtest]\ninitial_cash = 100\n");
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn valid_sma_config_passes() {
        let config = make_config(
            r#"
[strategy]
name = sma_crossover
fast = 10
slow = 30
size_pct = 0.5
cooldown = 2
"#,
        );
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn missing_strategy_name_fails() {
        let config = make_config("[strategy]\nfast = 10\nslow = 30\nsize_pct = 0.5\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, BarsimError::ConfigMissing { key, .. } if key == "name"));
    }

    #[test]
    fn unknown_strategy_name_fails() {
        let config = make_config("[strategy]\nname = momentum\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, BarsimError::ConfigInvalid { key, .. } if key == "name"));
    }

    #[test]
    fn slow_must_exceed_fast() {
        let config =
            make_config("[strategy]\nname = sma_crossover\nfast = 30\nslow = 10\nsize_pct = 0.5\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, BarsimError::ConfigInvalid { key, .. } if key == "slow"));
    }

    #[test]
    fn size_pct_above_one_fails() {
        let config =
            make_config("[strategy]\nname = sma_crossover\nfast = 10\nslow = 30\nsize_pct = 1.5\n");
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, BarsimError::ConfigInvalid { key, .. } if key == "size_pct"));
    }

    #[test]
    fn valid_mean_reversion_config_passes() {
        let config = make_config(
            r#"
[strategy]
name = mean_reversion
window = 20
entry_z = 2.0
exit_z = 0.5
size_pct = 0.25
stop_pct = 0.05
"#,
        );
        assert!(validate_strategy_config(&config).is_ok());
    }

    #[test]
    fn mean_reversion_window_too_small_fails() {
        let config = make_config(
            "[strategy]\nname = mean_reversion\nwindow = 1\nentry_z = 2.0\nsize_pct = 0.25\n",
        );
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, BarsimError::ConfigInvalid { key, .. } if key == "window"));
    }

    #[test]
    fn entry_z_must_exceed_exit_z() {
        let config = make_config(
            "[strategy]\nname = mean_reversion\nwindow = 20\nentry_z = 0.3\nexit_z = 0.5\nsize_pct = 0.25\n",
        );
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, BarsimError::ConfigInvalid { key, .. } if key == "entry_z"));
    }

    #[test]
    fn negative_stop_pct_fails() {
        let config = make_config(
            "[strategy]\nname = mean_reversion\nwindow = 20\nentry_z = 2.0\nexit_z = 0.5\nstop_pct = -0.05\nsize_pct = 0.25\n",
        );
        let err = validate_strategy_config(&config).unwrap_err();
        assert!(matches!(err, BarsimError::ConfigInvalid { key, .. } if key == "stop_pct"));
    }
}
