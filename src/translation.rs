use crate::instructions::{Instruction, InstructionKind, TurnSign};

/// Renders instructions into display text for one locale.
///
/// The synthesizer itself never concatenates user-facing text; anything a
/// traveller reads goes through this seam, so hosts can plug in their own
/// localization machinery.
pub trait Translation {
    fn describe(&self, instruction: &Instruction) -> String;
}

/// Built-in US English rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnUs;

impl EnUs {
    fn turn_phrase(sign: TurnSign) -> &'static str {
        match sign {
            TurnSign::UTurnLeft | TurnSign::UTurnRight => "make a U-turn",
            TurnSign::SharpLeft => "turn sharp left",
            TurnSign::Left => "turn left",
            TurnSign::SlightLeft => "turn slight left",
            TurnSign::KeepLeft => "keep left",
            TurnSign::KeepRight => "keep right",
            TurnSign::SlightRight => "turn slight right",
            TurnSign::Right => "turn right",
            TurnSign::SharpRight => "turn sharp right",
        }
    }
}

impl Translation for EnUs {
    fn describe(&self, instruction: &Instruction) -> String {
        let name = instruction.name.as_str();
        let onto = |phrase: &str| {
            if name.is_empty() {
                phrase.to_string()
            } else {
                format!("{phrase} onto {name}")
            }
        };

        let text = match &instruction.kind {
            InstructionKind::Continue => onto("continue"),
            InstructionKind::Turn { sign } => onto(Self::turn_phrase(*sign)),
            InstructionKind::Roundabout {
                exit_number,
                exited: true,
                ..
            } => onto(&format!("At roundabout, take exit {exit_number}")),
            InstructionKind::Roundabout { exited: false, .. } => onto("enter roundabout"),
            InstructionKind::Ferry => {
                if name.is_empty() {
                    "take ferry".to_string()
                } else {
                    format!("take ferry ({name})")
                }
            }
            InstructionKind::Finish => "arrive at destination".to_string(),
        };

        if instruction.exits_ferry {
            format!("leave ferry and {text}")
        } else {
            text
        }
    }
}
