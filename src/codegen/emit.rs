//! Rendering of the interface (`.h`) and table (`.c`) artifacts.
//!
//! The layout is a contract with the runtime's `model.h`:
//!
//! * neighbor arrays are length-prefixed and hold one-based references, and
//!   the topology aggregates point at `&table [-1]`, so a reference indexes
//!   its row directly;
//! * `<ID>_PLACE_INIT_<place>` expands to `{ marking }`;
//! * `<ID>_TRANS_INIT_<transition>` expands to `{ countdown, 0, 0 }`, the two
//!   zeros being the runtime's `notbefore` / `firstfail` bookkeeping;
//! * `PETRINET_SINGLETONS` switches from a shared `const petrinet_topo_t` to
//!   one materialized `petrinet_t` instance, named `PETRINET_GLOBAL_NAME`
//!   when that macro is set.
use std::fmt::Write;

use itertools::Itertools;

use crate::codegen::CompiledNet;
use crate::codegen::error::CodegenError;
use crate::codegen::ident::{c_string_literal, symbol_fragments};
use crate::net::{IndexVec, NodeKind, PlaceId, TransitionId};

pub const DEFAULT_MODEL_HEADER: &str = "perpetuum/model.h";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Runtime header included by the interface artifact.
    pub model_header: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            model_header: DEFAULT_MODEL_HEADER.to_string(),
        }
    }
}

/// The pair of generated files, held in memory until both are complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub identifier: String,
    pub header: String,
    pub source: String,
}

impl Artifacts {
    pub fn header_file_name(&self) -> String {
        format!("{}.h", self.identifier)
    }

    pub fn source_file_name(&self) -> String {
        format!("{}.c", self.identifier)
    }
}

struct Symbols {
    places: IndexVec<PlaceId, String>,
    transitions: IndexVec<TransitionId, String>,
}

pub fn render(net: &CompiledNet, options: &EmitOptions) -> Result<Artifacts, CodegenError> {
    let symbols = Symbols {
        places: symbol_fragments(NodeKind::Place, net.places.names())?,
        transitions: symbol_fragments(NodeKind::Transition, net.transitions.names())?,
    };
    Ok(Artifacts {
        identifier: net.identifier.clone(),
        header: render_header(net, &symbols, options),
        source: render_source(net, &symbols),
    })
}

fn banner(out: &mut String, file_name: &str) {
    let _ = writeln!(out, "/* {file_name}");
    let _ = writeln!(out, " *");
    let _ = writeln!(
        out,
        " * This is a generated file.  Do not edit it, but rather its source and"
    );
    let _ = writeln!(out, " * run pnc to produce a new version of this file.");
    let _ = writeln!(out, " */");
    let _ = writeln!(out);
    let _ = writeln!(out);
}

fn render_header(net: &CompiledNet, symbols: &Symbols, options: &EmitOptions) -> String {
    let id = &net.identifier;
    let mut out = String::new();

    banner(&mut out, &format!("{id}.h"));
    let _ = writeln!(out, "#ifndef PNC_GENERATED_{id}_H");
    let _ = writeln!(out, "#define PNC_GENERATED_{id}_H");
    let _ = writeln!(out);
    let _ = writeln!(out, "#include <stdint.h>");
    let _ = writeln!(out);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "typedef {} transref_t;",
        net.transition_width.c_type()
    );
    let _ = writeln!(out, "typedef {} placeref_t;", net.place_width.c_type());
    let _ = writeln!(out);
    let _ = writeln!(out, "#include <{}>", options.model_header);
    let _ = writeln!(out);
    let _ = writeln!(out);

    let _ = writeln!(out, "/* Place initialisation */");
    for (place, symbol) in symbols.places.iter_enumerated() {
        let _ = writeln!(
            out,
            "#define {id}_PLACE_INIT_{symbol} {{ {} }}",
            net.initial.marking(place)
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "/* Transition initialisation with countdown; set to inputs + non-empty inhibitors */"
    );
    for (transition, symbol) in symbols.transitions.iter_enumerated() {
        let _ = writeln!(
            out,
            "#define {id}_TRANS_INIT_{symbol} {{ {}, 0, 0 }}",
            net.initial.countdown(transition)
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "#ifdef PETRINET_SINGLETONS");
    let _ = writeln!(out, "#ifdef PETRINET_GLOBAL_NAME");
    let _ = writeln!(out, "extern petrinet_t PETRINET_GLOBAL_NAME;");
    let _ = writeln!(out, "#else");
    let _ = writeln!(out, "extern petrinet_t the_{id};");
    let _ = writeln!(out, "#endif");
    let _ = writeln!(out, "#endif");
    let _ = writeln!(out);

    let _ = writeln!(out, "#ifndef PETRINET_SINGLETONS");
    let _ = writeln!(out, "extern const petrinet_topo_t {id};");
    let _ = writeln!(out, "#else");
    let _ = writeln!(out, "#ifdef PETRINET_GLOBAL_NAME");
    let _ = writeln!(out, "#define {id} (&PETRINET_GLOBAL_NAME.topology)");
    let _ = writeln!(out, "#else");
    let _ = writeln!(out, "#define {id} (&the_{id}.topology)");
    let _ = writeln!(out, "#endif");
    let _ = writeln!(out, "#endif");
    let _ = writeln!(out);
    let _ = writeln!(out, "#endif /* PNC_GENERATED_{id}_H */");
    let _ = writeln!(out);
    let _ = writeln!(out);
    let _ = writeln!(out, "/* End of generated file {id}.h */");
    out
}

fn ref_list<I>(refs: impl ExactSizeIterator<Item = I>, one_based: impl Fn(I) -> u128) -> String {
    let len = refs.len() as u128;
    std::iter::once(len).chain(refs.map(one_based)).join(", ")
}

fn render_source(net: &CompiledNet, symbols: &Symbols) -> String {
    let id = &net.identifier;
    let place_count = net.places.len();
    let transition_count = net.transitions.len();
    let display_name = c_string_literal(&net.display_name);
    let mut out = String::new();

    banner(&mut out, &format!("{id}.c"));
    let _ = writeln!(out, "#include \"{id}.h\"");
    let _ = writeln!(out);
    let _ = writeln!(out);

    for (place, neighbors) in net.topology.places.iter_enumerated() {
        let symbol = &symbols.places[place];
        let _ = writeln!(
            out,
            "static const transref_t {id}_{symbol}_trans_out [] = {{ {} }};",
            ref_list(neighbors.trans_out.iter().copied(), TransitionId::one_based)
        );
        let _ = writeln!(
            out,
            "static const transref_t {id}_{symbol}_trans_out_inh [] = {{ {} }};",
            ref_list(neighbors.trans_out_inh.iter().copied(), TransitionId::one_based)
        );
        let _ = writeln!(out);
    }
    for (transition, neighbors) in net.topology.transitions.iter_enumerated() {
        let symbol = &symbols.transitions[transition];
        let _ = writeln!(
            out,
            "static const placeref_t {id}_{symbol}_place_in [] = {{ {} }};",
            ref_list(neighbors.place_in.iter().copied(), PlaceId::one_based)
        );
        let _ = writeln!(
            out,
            "static const placeref_t {id}_{symbol}_place_out [] = {{ {} }};",
            ref_list(neighbors.place_out.iter().copied(), PlaceId::one_based)
        );
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "static const place_topo_t {id}_places [] = {{");
    for (place, name) in net.places.iter_enumerated() {
        let symbol = &symbols.places[place];
        let _ = writeln!(
            out,
            "\t{{ {}, {id}_{symbol}_trans_out, {id}_{symbol}_trans_out_inh }},",
            c_string_literal(name)
        );
    }
    empty_row(&mut out, place_count);
    let _ = writeln!(out, "}};");
    let _ = writeln!(out);

    let _ = writeln!(out, "static const trans_topo_t {id}_transitions [] = {{");
    for (transition, name) in net.transitions.iter_enumerated() {
        let symbol = &symbols.transitions[transition];
        let _ = writeln!(
            out,
            "\t{{ {}, {id}_{symbol}_place_in, {id}_{symbol}_place_out }},",
            c_string_literal(name)
        );
    }
    empty_row(&mut out, transition_count);
    let _ = writeln!(out, "}};");
    let _ = writeln!(out);

    let _ = writeln!(out, "#ifdef PETRINET_SINGLETONS");
    let _ = writeln!(out, "static place_t the_{id}_places [] = {{");
    for symbol in symbols.places.iter() {
        let _ = writeln!(out, "\t{id}_PLACE_INIT_{symbol},");
    }
    empty_row(&mut out, place_count);
    let _ = writeln!(out, "}};");
    let _ = writeln!(out, "static trans_t the_{id}_transitions [] = {{");
    for symbol in symbols.transitions.iter() {
        let _ = writeln!(out, "\t{id}_TRANS_INIT_{symbol},");
    }
    empty_row(&mut out, transition_count);
    let _ = writeln!(out, "}};");
    let _ = writeln!(out);
    let _ = writeln!(out, "#ifdef PETRINET_GLOBAL_NAME");
    let _ = writeln!(out, "petrinet_t PETRINET_GLOBAL_NAME = {{");
    let _ = writeln!(out, "#else");
    let _ = writeln!(out, "petrinet_t the_{id} = {{");
    let _ = writeln!(out, "#endif");
    let _ = writeln!(out, "\t\"the_{id}\",");
    let _ = writeln!(out, "\t{{ /* PETRINET_SINGLETONS => inlined topology */");
    let _ = writeln!(out, "\t\t{display_name},");
    let _ = writeln!(out, "\t\t{place_count},");
    let _ = writeln!(out, "\t\t{transition_count},");
    let _ = writeln!(out, "\t\t&{id}_places [-1],");
    let _ = writeln!(out, "\t\t&{id}_transitions [-1],");
    let _ = writeln!(out, "\t}},");
    let _ = writeln!(out, "\t&the_{id}_places [-1],");
    let _ = writeln!(out, "\t&the_{id}_transitions [-1],");
    let _ = writeln!(out, "}};");
    let _ = writeln!(out, "#endif");
    let _ = writeln!(out);

    let _ = writeln!(out, "#ifndef PETRINET_SINGLETONS");
    let _ = writeln!(out, "const petrinet_topo_t {id} = {{");
    let _ = writeln!(out, "\t{display_name},");
    let _ = writeln!(out, "\t{place_count}, {transition_count},");
    let _ = writeln!(
        out,
        "\t&{id}_places [-1], &{id}_transitions [-1]"
    );
    let _ = writeln!(out, "}};");
    let _ = writeln!(out, "#endif");
    let _ = writeln!(out);
    let _ = writeln!(out);
    let _ = writeln!(out, "/* End of generated file {id}.c */");
    out
}

/// C forbids empty initializer lists; an empty class gets one zeroed row
/// that the counts in the topology never reach.
fn empty_row(out: &mut String, count: usize) {
    if count == 0 {
        let _ = writeln!(out, "\t{{ 0 }},");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::Compiler;
    use crate::codegen::oracle::{OracleKind, OracleSpec};
    use crate::net::NetModel;

    fn compile(model: &NetModel) -> Artifacts {
        let spec = OracleSpec::new(OracleKind::Sorted, 0);
        let compiled = Compiler::new(&spec).compile(model).unwrap();
        render(&compiled, &EmitOptions::default()).unwrap()
    }

    fn demo() -> NetModel {
        NetModel::builder("demo net")
            .place("A", 1)
            .place("B", 0)
            .place("G", 1)
            .transition("T")
            .transition("U")
            .arc("A", "T")
            .arc("B", "T")
            .arc("T", "B")
            .inhibitor_arc("G", "U")
            .arc("U", "A")
            .build()
            .unwrap()
    }

    #[test]
    fn header_declares_widths_and_initializers() {
        let artifacts = compile(&demo());
        let h = &artifacts.header;
        assert_eq!(artifacts.header_file_name(), "demo_net.h");
        assert!(h.contains("typedef uint8_t transref_t;\ntypedef uint8_t placeref_t;\n"));
        assert!(h.contains("#include <perpetuum/model.h>"));
        assert!(h.contains("#define demo_net_PLACE_INIT_A { 1 }\n"));
        assert!(h.contains("#define demo_net_PLACE_INIT_B { 0 }\n"));
        assert!(h.contains("#define demo_net_TRANS_INIT_T { 1, 0, 0 }\n"));
        assert!(h.contains("#define demo_net_TRANS_INIT_U { 1, 0, 0 }\n"));
        assert!(h.contains("extern const petrinet_topo_t demo_net;"));
        assert!(h.contains("#define demo_net (&the_demo_net.topology)"));
        assert!(h.ends_with("/* End of generated file demo_net.h */\n"));
    }

    #[test]
    fn source_lists_are_length_prefixed_and_one_based() {
        let c = compile(&demo()).source;
        // Sorted oracle: A=1 B=2 G=3, T=1 U=2 once one-based.
        assert!(c.contains("static const transref_t demo_net_A_trans_out [] = { 1, 1 };"));
        assert!(c.contains("static const transref_t demo_net_A_trans_out_inh [] = { 0 };"));
        assert!(c.contains("static const transref_t demo_net_G_trans_out_inh [] = { 1, 2 };"));
        assert!(c.contains("static const placeref_t demo_net_T_place_in [] = { 2, 1, 2 };"));
        assert!(c.contains("static const placeref_t demo_net_T_place_out [] = { 1, 2 };"));
        assert!(c.contains("static const placeref_t demo_net_U_place_in [] = { 0 };"));
        assert!(c.contains(
            "\t{ \"A\", demo_net_A_trans_out, demo_net_A_trans_out_inh },\n"
        ));
        assert!(c.contains("\t{ \"T\", demo_net_T_place_in, demo_net_T_place_out },\n"));
        assert!(c.contains("\tdemo_net_TRANS_INIT_U,\n"));
        assert!(c.contains("const petrinet_topo_t demo_net = {\n\t\"demo net\",\n\t3, 2,\n"));
        assert!(c.contains("\t&demo_net_places [-1], &demo_net_transitions [-1]\n"));
    }

    #[test]
    fn rows_follow_index_order() {
        let c = compile(&demo()).source;
        let a = c.find("\t{ \"A\"").unwrap();
        let b = c.find("\t{ \"B\"").unwrap();
        let g = c.find("\t{ \"G\"").unwrap();
        assert!(a < b && b < g);
    }

    #[test]
    fn empty_net_stays_valid_c() {
        let model = NetModel::builder("!!").build().unwrap();
        let artifacts = compile(&model);
        assert_eq!(artifacts.identifier, "perpetuum");
        assert!(
            artifacts
                .source
                .contains("static const place_topo_t perpetuum_places [] = {\n\t{ 0 },\n};")
        );
    }

    #[test]
    fn clashing_symbols_are_fatal() {
        let model = NetModel::builder("n")
            .place("a-b", 0)
            .place("a b", 0)
            .build()
            .unwrap();
        let spec = OracleSpec::new(OracleKind::Sorted, 0);
        let compiled = Compiler::new(&spec).compile(&model).unwrap();
        let err = render(&compiled, &EmitOptions::default()).unwrap_err();
        assert!(matches!(err, CodegenError::SymbolClash { kind: NodeKind::Place, .. }));
    }

    #[test]
    fn model_header_is_configurable() {
        let spec = OracleSpec::new(OracleKind::Sorted, 0);
        let compiled = Compiler::new(&spec).compile(&demo()).unwrap();
        let options = EmitOptions {
            model_header: "rt/petri.h".into(),
        };
        let artifacts = render(&compiled, &options).unwrap();
        assert!(artifacts.header.contains("#include <rt/petri.h>\n"));
    }
}
