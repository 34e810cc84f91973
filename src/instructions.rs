//! Static x86-64 reference tables for hover, completion and highlighting.

/// An instruction mnemonic with a one-line description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub name: &'static str,
    pub summary: &'static str,
}

const fn op(name: &'static str, summary: &'static str) -> Opcode {
    Opcode { name, summary }
}

pub static OPCODES: &[Opcode] = &[
    op("mov", "Copy the source operand to the destination"),
    op("movl", "Copy a 32-bit value"),
    op("movq", "Copy a 64-bit value"),
    op("movb", "Copy an 8-bit value"),
    op("movw", "Copy a 16-bit value"),
    op("push", "Push a value onto the stack"),
    op("pushl", "Push a 32-bit value onto the stack"),
    op("pushq", "Push a 64-bit value onto the stack"),
    op("pop", "Pop a value from the stack"),
    op("popl", "Pop a 32-bit value from the stack"),
    op("popq", "Pop a 64-bit value from the stack"),
    op("ret", "Return from procedure"),
    op("call", "Call procedure"),
    op("jmp", "Unconditional jump"),
    op("je", "Jump if equal (ZF=1)"),
    op("jne", "Jump if not equal (ZF=0)"),
    op("jg", "Jump if greater (signed)"),
    op("jge", "Jump if greater or equal (signed)"),
    op("jl", "Jump if less (signed)"),
    op("jle", "Jump if less or equal (signed)"),
    op("jz", "Jump if zero (ZF=1)"),
    op("jnz", "Jump if not zero (ZF=0)"),
    op("add", "Integer addition"),
    op("addl", "32-bit integer addition"),
    op("addq", "64-bit integer addition"),
    op("sub", "Integer subtraction"),
    op("subl", "32-bit integer subtraction"),
    op("subq", "64-bit integer subtraction"),
    op("imul", "Signed multiply"),
    op("idiv", "Signed divide"),
    op("and", "Bitwise AND"),
    op("or", "Bitwise OR"),
    op("xor", "Bitwise exclusive OR"),
    op("not", "Bitwise NOT (one's complement)"),
    op("neg", "Two's complement negation"),
    op("inc", "Increment by 1"),
    op("dec", "Decrement by 1"),
    op("cmp", "Compare two operands and set flags"),
    op("test", "Bitwise AND that only sets flags"),
    op("lea", "Load effective address"),
    op("nop", "No operation"),
    op("int", "Call to interrupt procedure"),
    op("syscall", "Fast system call"),
];

pub static REGISTERS: &[&str] = &[
    "%eax", "%ebx", "%ecx", "%edx", "%esi", "%edi", "%esp", "%ebp", "%rax", "%rbx", "%rcx", "%rdx",
    "%rsi", "%rdi", "%rsp", "%rbp", "%r8", "%r9", "%r10", "%r11", "%r12", "%r13", "%r14", "%r15",
    "%cs", "%ds", "%es", "%fs", "%gs", "%ss", "%cr0", "%cr2", "%cr3", "%cr4", "%db0", "%db1",
    "%db2", "%db3", "%db6", "%db7",
];

/// Case-insensitive opcode lookup (`MOV` and `mov` are the same mnemonic).
pub fn opcode(name: &str) -> Option<&'static Opcode> {
    OPCODES.iter().find(|op| op.name.eq_ignore_ascii_case(name))
}

/// Accepts the register with or without its `%` sigil.
pub fn register(name: &str) -> Option<&'static str> {
    let bare = name.strip_prefix('%').unwrap_or(name);
    REGISTERS
        .iter()
        .copied()
        .find(|reg| reg[1..].eq_ignore_ascii_case(bare))
}

/// What a register name refers to, for hover text.
pub fn register_summary(register: &str) -> &'static str {
    match register.trim_start_matches('%') {
        "cs" | "ds" | "es" | "fs" | "gs" | "ss" => "Segment register",
        reg if reg.starts_with("cr") => "Control register",
        reg if reg.starts_with("db") => "Debug register",
        reg if reg.starts_with('e') => "32-bit general purpose register",
        _ => "64-bit general purpose register",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_lookup_ignores_case() {
        assert_eq!(opcode("MOVQ").map(|op| op.name), Some("movq"));
        assert!(opcode("frobnicate").is_none());
    }

    #[test]
    fn test_register_lookup() {
        assert_eq!(register("%rax"), Some("%rax"));
        assert_eq!(register("R12"), Some("%r12"));
        assert_eq!(register("%xmm0"), None);
    }

    #[test]
    fn test_register_summary() {
        assert_eq!(register_summary("%eax"), "32-bit general purpose register");
        assert_eq!(register_summary("%r8"), "64-bit general purpose register");
        assert_eq!(register_summary("%fs"), "Segment register");
        assert_eq!(register_summary("%cr3"), "Control register");
    }
}
