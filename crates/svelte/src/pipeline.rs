//! The transpiler: stage composition and extension points.

use crate::convert::{Converter, NodeHandler};
use crate::escape::escape_tree;
use crate::literal::expand;
use crate::markup::MarkupNode;
use crate::metadata::inject_metadata;
use crate::raw::{finalize, raw_handlers, reclassify};
use crate::serialize::to_html;
use md2sv_core::{DocNode, DocTransform, Document, Md2svError, ParseOptions, ParserPipeline, ParserSetup};

/// Mutates the markup tree between stages.
pub trait MarkupTransform: Send + Sync {
    /// Mutate the tree in place. The document gives access to the source.
    fn transform(&self, root: &mut MarkupNode, document: &Document);
}

impl<F> MarkupTransform for F
where
    F: Fn(&mut MarkupNode, &Document) + Send + Sync,
{
    fn transform(&self, root: &mut MarkupNode, document: &Document) {
        (self)(root, document)
    }
}

/// Collects options, transforms, and handlers for a [`Processor`].
///
/// ```
/// use md2sv_svelte::ProcessorBuilder;
///
/// let processor = ProcessorBuilder::new()
///     .pre_document(|options: &mut md2sv_core::ParseOptions| options.gfm = true)
///     .build();
/// assert_eq!(processor.process("~~x~~").unwrap(), "<p><del>x</del></p>");
/// ```
pub struct ProcessorBuilder {
    options: ParseOptions,
    setups: Vec<Box<dyn ParserSetup>>,
    parser: ParserPipeline,
    converter: Converter,
    pre_markup: Vec<Box<dyn MarkupTransform>>,
    post_markup: Vec<Box<dyn MarkupTransform>>,
}

impl Default for ProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessorBuilder {
    /// Builder with default parse options and the raw directive stages.
    pub fn new() -> Self {
        let mut parser = ParserPipeline::new(ParseOptions::default());
        parser.add_transform(|root: &mut DocNode, _: &Document| reclassify(root));
        Self {
            options: ParseOptions::default(),
            setups: Vec::new(),
            parser,
            converter: Converter::new(raw_handlers()),
            pre_markup: Vec::new(),
            post_markup: Vec::new(),
        }
    }

    /// Replaces the base parse options. Setups still run on top of them.
    pub fn options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Adjusts parse options before any tree is built.
    pub fn pre_document<S: ParserSetup + 'static>(mut self, setup: S) -> Self {
        self.setups.push(Box::new(setup));
        self
    }

    /// Runs on the document tree after raw directives are reclassified.
    pub fn post_document<T: DocTransform + 'static>(mut self, transform: T) -> Self {
        self.parser.add_transform(transform);
        self
    }

    /// Runs on the markup tree right after conversion, before escaping.
    pub fn pre_markup<T: MarkupTransform + 'static>(mut self, transform: T) -> Self {
        self.pre_markup.push(Box::new(transform));
        self
    }

    /// Runs on the markup tree right before serialization.
    pub fn post_markup<T: MarkupTransform + 'static>(mut self, transform: T) -> Self {
        self.post_markup.push(Box::new(transform));
        self
    }

    /// Converts document-tree nodes of `kind` (see
    /// [`md2sv_core::DocKind::name`]) with `handler`.
    pub fn handler<H: NodeHandler + 'static>(mut self, kind: &'static str, handler: H) -> Self {
        self.converter.handlers_mut().insert(kind, handler);
        self
    }

    /// Finishes the processor.
    pub fn build(mut self) -> Processor {
        let mut options = self.options;
        for setup in &self.setups {
            setup.setup(&mut options);
        }
        *self.parser.options_mut() = options;
        Processor {
            parser: self.parser,
            converter: self.converter,
            pre_markup: self.pre_markup,
            post_markup: self.post_markup,
        }
    }
}

/// Markdown to Svelte transpiler.
///
/// Holds no per-run state, so one processor can serve many threads.
pub struct Processor {
    parser: ParserPipeline,
    converter: Converter,
    pre_markup: Vec<Box<dyn MarkupTransform>>,
    post_markup: Vec<Box<dyn MarkupTransform>>,
}

impl Default for Processor {
    fn default() -> Self {
        ProcessorBuilder::new().build()
    }
}

impl Processor {
    /// Parse options in effect.
    pub fn options(&self) -> &ParseOptions {
        self.parser.options()
    }

    /// Transpiles `source`, frontmatter included.
    pub fn process(&self, source: &str) -> Result<String, Md2svError> {
        let document = Document::parse(source)?;
        self.process_document(&document)
    }

    /// Transpiles an already split document.
    pub fn process_document(&self, document: &Document) -> Result<String, Md2svError> {
        let mut tree = self.parser.parse(document)?;
        log::debug!("Parsed document tree with {} top-level nodes", tree.children.len());

        let mut markup = self.converter.convert(&mut tree, document)?;
        log::debug!("Converted to markup tree with {} top-level nodes", markup.children().len());

        for transform in &self.pre_markup {
            transform.transform(&mut markup, document);
        }

        escape_tree(&mut markup);
        expand(&mut markup);
        finalize(&mut markup);
        log::debug!("Escaped, expanded, and finalized markup");

        inject_metadata(&mut markup, document.metadata())?;
        if !document.metadata().is_empty() {
            log::debug!("Injected {} metadata keys", document.metadata().len());
        }

        for transform in &self.post_markup {
            transform.transform(&mut markup, document);
        }

        to_html(&markup)
    }
}
