//! Displaying IR.

use super::{Inst, InstKind, Tuple, Unit};
use crate::cfg;

use std::fmt::{Display, Formatter, Result as FmtResult};

pub struct UnitDisplay<'a>(pub(crate) &'a Unit, pub(crate) &'a str, pub(crate) bool);

impl<'a> Display for UnitDisplay<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let unit = self.0;
        let indent = self.1;
        let verbose = self.2;

        writeln!(f, "{}unit entry={} {{", indent, unit.entry)?;

        let preds = if verbose {
            Some(cfg::compute_preds(unit))
        } else {
            None
        };

        for (block, data) in unit.blocks.entries() {
            writeln!(
                f,
                "{}  {} [{}, weight {}]:",
                indent, block, data.area, data.weight
            )?;
            if let Some(preds) = &preds {
                for &pred in &preds[block] {
                    writeln!(f, "{}    # pred: {}", indent, pred)?;
                }
            }
            for inst in &data.code {
                if verbose {
                    writeln!(
                        f,
                        "{}    {} ; ctx {}",
                        indent,
                        InstDisplay(unit, inst),
                        inst.ctx.0
                    )?;
                } else {
                    writeln!(f, "{}    {}", indent, InstDisplay(unit, inst))?;
                }
            }
        }

        writeln!(f, "{}}}", indent)?;

        Ok(())
    }
}

/// Displays one instruction, resolving its register tuples against the
/// owning unit.
pub struct InstDisplay<'a>(pub &'a Unit, pub &'a Inst);

impl<'a> InstDisplay<'a> {
    fn tuple(&self, tuple: Tuple) -> String {
        self.0.tuples[tuple]
            .iter()
            .map(|reg| format!("{}", reg))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<'a> Display for InstDisplay<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let name = self.1.kind.opcode_name();
        match &self.1.kind {
            InstKind::Nop | InstKind::LandingPad | InstKind::Ret | InstKind::Trap => {
                write!(f, "{}", name)
            }
            InstKind::Jmp { target } => write!(f, "{} {}", name, target),
            InstKind::Jcc { cond, taken, next } => {
                write!(f, "{} {}, {}, {}", name, cond, taken, next)
            }
            InstKind::Switch { index, targets } => write!(
                f,
                "{} {}, [{}]",
                name,
                index,
                targets
                    .iter()
                    .map(|target| format!("{}", target))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            InstKind::Invoke {
                callee,
                next,
                catch,
            } => write!(f, "{} {}, {}, catch {}", name, callee, next, catch),
            InstKind::PhiDef { defs } => write!(f, "{} ({})", name, self.tuple(*defs)),
            InstKind::PhiJmp { target, uses } => {
                write!(f, "{} {}, ({})", name, target, self.tuple(*uses))
            }
            InstKind::Other { defs, uses, .. } => {
                if !defs.is_empty() {
                    write!(f, "{} = ", self.tuple(*defs))?;
                }
                write!(f, "{}", name)?;
                if !uses.is_empty() {
                    write!(f, " {}", self.tuple(*uses))?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::ir::{Area, InstKind, IrCtx, Unit};

    #[test]
    fn display_unit() {
        let mut unit = Unit::new();
        let b1 = unit.make_block(Area::Cold, 3);
        let cond = unit.make_reg();
        let defs = unit.make_tuple(&[cond]);
        let uses = unit.make_tuple(&[]);
        unit.append(
            unit.entry,
            InstKind::Other {
                mnemonic: "ldimm",
                defs,
                uses,
            },
            IrCtx(0),
        );
        unit.append(
            unit.entry,
            InstKind::Jcc {
                cond,
                taken: b1,
                next: b1,
            },
            IrCtx(7),
        );
        unit.append(b1, InstKind::Ret, IrCtx(1));

        assert_eq!(
            format!("{}", unit.display("")),
            "unit entry=B0 {
  B0 [main, weight 1]:
    %0 = ldimm
    jcc %0, B1, B1
  B1 [cold, weight 3]:
    ret
}
"
        );
        assert_eq!(
            format!("{}", unit.display_verbose("| ")),
            "| unit entry=B0 {
|   B0 [main, weight 1]:
|     %0 = ldimm ; ctx 0
|     jcc %0, B1, B1 ; ctx 7
|   B1 [cold, weight 3]:
|     # pred: B0
|     # pred: B0
|     ret ; ctx 1
| }
"
        );
    }
}
