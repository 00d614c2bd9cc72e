use aerate_engine::{AerateError, NullIndex, RenderEngine, Target, TargetKind};
use aerate_recipes::{adjuster, aerate, inline, renderer};
use aerate_tree::{ParseOptions, Tree};
use std::collections::HashMap;

fn document(xml: &str) -> Tree {
    Tree::parse_with(xml, ParseOptions::remove_blank_text()).unwrap()
}

fn adjusted(xml: &str) -> String {
    let mut tree = document(xml);
    let root = tree.root();
    adjuster::adjust(&mut tree, root).unwrap();
    tree.to_xml(root)
}

fn null_renderer() -> RenderEngine {
    renderer::engine(Box::new(NullIndex)).unwrap()
}

#[test]
fn test_presentation_inline_is_removed() {
    assert_eq!(
        adjusted("<root><htmlonly>x</htmlonly><bold>y</bold></root>"),
        "<root><bold>y</bold></root>"
    );
    let xml = r#"
        <root>
            <htmlonly>test</htmlonly>
            <manonly>test</manonly>
            <rtfonly>test</rtfonly>
            <latexonly>test</latexonly>
            <docbookonly>test</docbookonly>
        </root>
    "#;
    assert_eq!(adjusted(xml), "<root/>");
}

#[test]
fn test_nested_inline_is_lifted() {
    assert_eq!(
        adjusted("<root>a<bold>b<emphasis>c</emphasis>d</bold>e</root>"),
        "<root>a<bold>b</bold><emphasis>c</emphasis><bold>d</bold>e</root>"
    );
}

#[test]
fn test_inline_whitespace_is_redistributed() {
    assert_eq!(
        adjusted("<root>a<bold>  test  </bold>c</root>"),
        "<root>a  <bold>test</bold>  c</root>"
    );
}

#[test]
fn test_span_escapes_depend_on_preceding_text() {
    assert_eq!(inline::BOLD.render("test", None, ""), "**test**");
    assert_eq!(inline::BOLD.render("test", None, "x"), "\\ **test**");
    assert_eq!(inline::BOLD.render("test", None, "*"), "\\ **test**");
}

#[test]
fn test_paragraphs_are_removed_or_split() {
    assert_eq!(
        adjusted("<root><para/><para>text<programlisting/></para></root>"),
        "<root><para>text</para><para><programlisting/></para></root>"
    );
}

#[test]
fn test_adjust_is_idempotent() {
    let xml = "<detaileddescription><para>a<bold>b<emphasis> c </emphasis></bold>\
               <itemizedlist><listitem><para>x</para></listitem></itemizedlist>tail\
               <simplesect kind=\"note\"><para>n1</para></simplesect>\
               <simplesect kind=\"note\"><para>n2</para></simplesect></para>\
               <para><latexonly>l</latexonly></para></detaileddescription>";

    let mut once = document(xml);
    let once_root = once.root();
    adjuster::adjust(&mut once, once_root).unwrap();

    let mut twice = document(xml);
    let twice_root = twice.root();
    adjuster::adjust(&mut twice, twice_root).unwrap();
    adjuster::adjust(&mut twice, twice_root).unwrap();

    assert!(once.semantically_equal(once_root, &twice, twice_root));
}

#[test]
fn test_adjust_conserves_text() {
    let xml = "<root><para>a<bold>b<emphasis>c</emphasis>d</bold>e\
               <programlisting><codeline>f</codeline></programlisting>g\
               <simplesect kind=\"see\"><para>h</para></simplesect>\
               <simplesect kind=\"see\"><para>i</para></simplesect></para></root>";
    let mut tree = document(xml);
    let root = tree.root();
    let before = tree.string_value(root);
    adjuster::adjust(&mut tree, root).unwrap();
    assert_eq!(tree.string_value(root), before);
}

#[test]
fn test_render_function() {
    let xml = "<memberdef kind=\"function\" id=\"f\"><type>int</type>\
               <definition>int open_file</definition><argsstring>(const char *path)</argsstring>\
               <name>open_file</name>\
               <briefdescription><para>Open a <bold>file</bold>.</para></briefdescription>\
               <detaileddescription><para>Opens it.<parameterlist kind=\"param\"><parameteritem>\
               <parameternamelist><parametername>path</parametername></parameternamelist>\
               <parameterdescription><para>Where.</para></parameterdescription>\
               </parameteritem></parameterlist>\
               <simplesect kind=\"return\"><para>Zero.</para></simplesect></para></detaileddescription>\
               <inbodydescription/></memberdef>";
    let mut tree = document(xml);
    let root = tree.root();
    let output = aerate(&mut tree, root, &null_renderer()).unwrap();
    assert_eq!(
        output,
        ".. c:function:: int open_file(const char *path)\n\n   \
         Open a **file**.\n\n   \
         Opens it.\n\n   \
         :param path: Where.\n\n   \
         :return: Zero.\n\n"
    );
}

#[test]
fn test_render_indented_source() {
    let xml = "<detaileddescription><para>Opens it.\n    \
               <parameterlist kind=\"param\"><parameteritem>\
               <parameternamelist><parametername>p</parametername></parameternamelist>\
               <parameterdescription><para>d</para></parameterdescription>\
               </parameteritem></parameterlist>\n    See also x.\n</para></detaileddescription>";
    let mut tree = document(xml);
    let root = tree.root();
    assert_eq!(
        aerate(&mut tree, root, &null_renderer()).unwrap(),
        "Opens it.\n\n:param p: d\n\nSee also x."
    );
}

#[test]
fn test_render_linebreak_and_link_markup() {
    let mut tree = document("<briefdescription><para>a<linebreak/>b</para></briefdescription>");
    let root = tree.root();
    assert_eq!(aerate(&mut tree, root, &null_renderer()).unwrap(), "a\nb");

    let mut tree = document("<para>See <ulink url=\"u\"><bold>the</bold> guide</ulink>.</para>");
    let root = tree.root();
    assert_eq!(
        aerate(&mut tree, root, &null_renderer()).unwrap(),
        "See `the guide <u>`_."
    );
}

#[test]
fn test_render_define_and_typedef() {
    let mut tree = document(
        "<memberdef kind=\"define\"><name>MAX</name><param><defname>a</defname></param>\
         <param><defname>b</defname></param>\
         <briefdescription><para>Larger of two.</para></briefdescription></memberdef>",
    );
    let root = tree.root();
    assert_eq!(
        aerate(&mut tree, root, &null_renderer()).unwrap(),
        ".. c:macro:: MAX(a, b)\n\n   Larger of two.\n\n"
    );

    let mut tree = document("<memberdef kind=\"define\"><name>VERSION</name></memberdef>");
    let root = tree.root();
    assert_eq!(
        aerate(&mut tree, root, &null_renderer()).unwrap(),
        ".. c:macro:: VERSION\n\n"
    );

    let mut tree = document(
        "<memberdef kind=\"typedef\"><type>struct handle *</type><name>handle_t</name></memberdef>",
    );
    let root = tree.root();
    assert_eq!(
        aerate(&mut tree, root, &null_renderer()).unwrap(),
        ".. c:type:: struct handle * handle_t\n\n"
    );
}

#[test]
fn test_render_resolves_references() {
    let mut targets = HashMap::new();
    targets.insert("g".to_string(), Target::new(TargetKind::Function, "close_file"));
    let engine = renderer::engine(Box::new(targets)).unwrap();

    let mut tree = Tree::parse("<para>Pair with <ref refid=\"g\">close_file</ref>.</para>").unwrap();
    let root = tree.root();
    assert_eq!(
        aerate(&mut tree, root, &engine).unwrap(),
        "Pair with :c:func:`close_file`."
    );
}

#[test]
fn test_missing_function_signature() {
    let mut tree = document("<memberdef kind=\"function\"><name>f</name></memberdef>");
    let root = tree.root();
    let error = aerate(&mut tree, root, &null_renderer()).unwrap_err();
    assert!(matches!(error, AerateError::Missing { .. }));
}
