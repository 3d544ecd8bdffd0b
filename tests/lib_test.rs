//! Library integration tests.

use autosetup::SetupError;

#[test]
fn error_types_are_public() {
    let err = SetupError::UnknownStep {
        step: "test".into(),
    };
    assert!(err.to_string().contains("test"));
    assert!(!err.is_configuration());
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> autosetup::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use autosetup::cli::{Cli, Commands};
    use clap::Parser;

    let cli = Cli::parse_from(["autosetup", "status", "--json"]);
    assert!(cli.command.is_some());

    if let Some(Commands::Status(args)) = cli.command {
        assert!(args.json);
    } else {
        panic!("Expected Status command");
    }
}

#[test]
fn builtin_table_and_registry_agree() {
    use autosetup::runner::StepTable;
    use autosetup::steps::StepRegistry;

    let table = StepTable::builtin().unwrap();
    assert_eq!(table.len(), 16);
    StepRegistry::builtin().validate(&table).unwrap();
}
