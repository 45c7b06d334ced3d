#![no_main]

use std::sync::{Arc, Mutex};

use arbitrary::Arbitrary;
use commandant::{
    Command, CommandContext, CommandLine, CommandManager, CommandOutcome, CommandSyntax,
    ManagerConfig, ParamKind,
};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug, Clone, Copy)]
enum FuzzOp {
    Execute(u8),
    Undo,
    Redo,
    SetMax(u8),
    Clear,
}

type Doc = Arc<Mutex<Vec<u8>>>;

struct Append {
    doc: Doc,
}

impl Command for Append {
    fn name(&self) -> &str {
        "Append"
    }

    fn is_undoable(&self) -> bool {
        true
    }

    fn syntax(&self) -> CommandSyntax {
        CommandSyntax::new().required("value", "Value to append.", ParamKind::Int)
    }

    fn execute(&mut self, _ctx: &mut CommandContext<'_>, line: &CommandLine) -> CommandOutcome {
        let value = line
            .value_as::<u8>("value")
            .map_err(|err| err.to_string())?
            .unwrap_or(0);
        self.doc.lock().unwrap().push(value);
        Ok(String::new())
    }

    fn undo(&mut self, _ctx: &mut CommandContext<'_>, _line: &CommandLine) -> CommandOutcome {
        self.doc.lock().unwrap().pop();
        Ok(String::new())
    }

    fn clone_prototype(&self) -> Box<dyn Command> {
        Box::new(Append {
            doc: self.doc.clone(),
        })
    }
}

fuzz_target!(|ops: Vec<FuzzOp>| {
    // Cap length to keep fuzzing fast.
    if ops.len() > 512 {
        return;
    }

    let doc: Doc = Arc::new(Mutex::new(Vec::new()));
    let mut manager = CommandManager::with_config(ManagerConfig::new(4));
    manager
        .register_command(Box::new(Append { doc: doc.clone() }))
        .expect("registration");

    // Net number of appends applied to the document.
    let mut applied: usize = 0;

    for op in ops {
        match op {
            FuzzOp::Execute(value) => {
                manager
                    .execute_command(&format!("Append -value {value}"))
                    .expect("append");
                applied += 1;
            }
            FuzzOp::Undo => {
                if manager.undo().is_ok() {
                    applied -= 1;
                }
            }
            FuzzOp::Redo => {
                if manager.redo().is_ok() {
                    applied += 1;
                }
            }
            FuzzOp::SetMax(max) => manager.set_max_history_items(max as usize % 8),
            FuzzOp::Clear => manager.clear_history(),
        }

        // Structural invariants that must hold after every operation.
        let history = manager.history();
        assert!(history.len() <= history.max_items(), "capacity exceeded");
        assert!(history.max_items() >= 1, "capacity clamp violated");
        if let Some(cursor) = history.cursor() {
            assert!(cursor < history.len(), "cursor out of range");
        }
        assert_eq!(manager.can_undo(), history.cursor().is_some());
        if history.is_empty() {
            assert!(!manager.can_redo(), "redo target in empty history");
        }
        assert_eq!(doc.lock().unwrap().len(), applied, "document drifted");
    }

    // Item numbers stay strictly increasing in buffer order.
    let item_nrs: Vec<u64> = manager.history().iter().map(|e| e.item_nr()).collect();
    for pair in item_nrs.windows(2) {
        assert!(pair[0] < pair[1], "item numbers out of order: {item_nrs:?}");
    }

    // Draining the undo side must terminate and end on a boundary error.
    while manager.can_undo() {
        manager.undo().expect("undo with can_undo() true");
        applied -= 1;
    }
    assert!(manager.undo().is_err(), "undo past the boundary succeeded");
    assert_eq!(manager.history().cursor(), None);
    assert_eq!(doc.lock().unwrap().len(), applied);
});
