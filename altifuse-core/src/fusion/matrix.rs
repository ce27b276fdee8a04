//! Matrix operations for the Kalman filter
//!
//! Basic linear algebra on fixed-size `f64` arrays without heap allocation.
//! Dimensions are const generics, so shape errors are compile errors.
//!
//! Inversion goes through an LU decomposition with partial pivoting rather
//! than closed-form 1×1/2×2 formulas, so the same path serves every filter
//! shape.

/// Matrix type using const generics
pub type Matrix<const R: usize, const C: usize> = [[f64; C]; R];

/// Square matrix type
pub type SquareMatrix<const N: usize> = Matrix<N, N>;

/// Vector type
pub type Vector<const N: usize> = [f64; N];

/// Identity matrix
pub fn identity<const N: usize>() -> SquareMatrix<N> {
    let mut result = [[0.0; N]; N];
    for (i, row) in result.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    result
}

/// Diagonal matrix from a vector
pub fn diagonal<const N: usize>(values: &Vector<N>) -> SquareMatrix<N> {
    let mut result = [[0.0; N]; N];
    for (i, row) in result.iter_mut().enumerate() {
        row[i] = values[i];
    }
    result
}

/// Matrix multiplication: C = A × B
///
/// Dimensions: A[R×K] × B[K×C] = C[R×C]
pub fn multiply<const R: usize, const K: usize, const C: usize>(
    a: &Matrix<R, K>,
    b: &Matrix<K, C>,
    result: &mut Matrix<R, C>,
) {
    for i in 0..R {
        for j in 0..C {
            result[i][j] = 0.0;
            for k in 0..K {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
}

/// Matrix transpose: B = Aᵀ
pub fn transpose<const R: usize, const C: usize>(
    a: &Matrix<R, C>,
    result: &mut Matrix<C, R>,
) {
    for i in 0..R {
        for j in 0..C {
            result[j][i] = a[i][j];
        }
    }
}

/// Matrix addition: C = A + B
pub fn add<const R: usize, const C: usize>(
    a: &Matrix<R, C>,
    b: &Matrix<R, C>,
    result: &mut Matrix<R, C>,
) {
    for i in 0..R {
        for j in 0..C {
            result[i][j] = a[i][j] + b[i][j];
        }
    }
}

/// Matrix subtraction: C = A - B
pub fn sub<const R: usize, const C: usize>(
    a: &Matrix<R, C>,
    b: &Matrix<R, C>,
    result: &mut Matrix<R, C>,
) {
    for i in 0..R {
        for j in 0..C {
            result[i][j] = a[i][j] - b[i][j];
        }
    }
}

/// Matrix-vector multiplication: y = A × x
pub fn matvec<const R: usize, const C: usize>(
    matrix: &Matrix<R, C>,
    vector: &Vector<C>,
    result: &mut Vector<R>,
) {
    for i in 0..R {
        result[i] = 0.0;
        for j in 0..C {
            result[i] += matrix[i][j] * vector[j];
        }
    }
}

/// Make matrix symmetric: A = (A + Aᵀ) / 2
///
/// Keeps covariance matrices symmetric against rounding drift
pub fn make_symmetric<const N: usize>(matrix: &mut SquareMatrix<N>) {
    for i in 0..N {
        for j in i + 1..N {
            let avg = (matrix[i][j] + matrix[j][i]) * 0.5;
            matrix[i][j] = avg;
            matrix[j][i] = avg;
        }
    }
}

/// True when every element is finite
pub fn is_finite<const R: usize, const C: usize>(matrix: &Matrix<R, C>) -> bool {
    matrix.iter().flatten().all(|v| v.is_finite())
}

/// LU decomposition with partial pivoting: P·A = L·U
///
/// `L` (unit diagonal, implicit) and `U` share one array. `permutation[i]`
/// is the row of `A` that ended up in row `i`.
#[derive(Debug, Clone, Copy)]
pub struct LuDecomposition<const N: usize> {
    lu: SquareMatrix<N>,
    permutation: [usize; N],
}

/// Factor `a`, or `None` if it is singular to working precision
///
/// Scaled partial pivoting: each candidate pivot is measured against the
/// largest entry of its own row, and rejected when that ratio is below
/// `N · ε`. A channel inflated to 1e16 sits in its own row and does not
/// raise the threshold for the others.
pub fn lu_decompose<const N: usize>(a: &SquareMatrix<N>) -> Option<LuDecomposition<N>> {
    if !is_finite(a) {
        return None;
    }

    let mut row_scale = [0.0f64; N];
    for (scale, row) in row_scale.iter_mut().zip(a.iter()) {
        *scale = row.iter().fold(0.0f64, |max, v| max.max(v.abs()));
        if *scale == 0.0 {
            return None;
        }
    }
    let tolerance = N as f64 * f64::EPSILON;

    let mut lu = *a;
    let mut permutation = [0usize; N];
    for (i, slot) in permutation.iter_mut().enumerate() {
        *slot = i;
    }

    for k in 0..N {
        // Find pivot, relative to its row
        let mut pivot_row = k;
        let mut pivot_ratio = lu[k][k].abs() / row_scale[k];
        for i in (k + 1)..N {
            let ratio = lu[i][k].abs() / row_scale[i];
            if ratio > pivot_ratio {
                pivot_ratio = ratio;
                pivot_row = i;
            }
        }

        if pivot_ratio <= tolerance {
            return None;
        }

        if pivot_row != k {
            lu.swap(k, pivot_row);
            permutation.swap(k, pivot_row);
            row_scale.swap(k, pivot_row);
        }

        for i in (k + 1)..N {
            let factor = lu[i][k] / lu[k][k];
            lu[i][k] = factor;
            for j in (k + 1)..N {
                lu[i][j] -= factor * lu[k][j];
            }
        }
    }

    Some(LuDecomposition { lu, permutation })
}

impl<const N: usize> LuDecomposition<N> {
    /// Solve A×x = b by forward then back substitution
    pub fn solve(&self, b: &Vector<N>) -> Vector<N> {
        // Forward substitution: L×y = P×b
        let mut y = [0.0; N];
        for i in 0..N {
            let mut sum = b[self.permutation[i]];
            for j in 0..i {
                sum -= self.lu[i][j] * y[j];
            }
            y[i] = sum;
        }

        // Back substitution: U×x = y
        let mut x = [0.0; N];
        for i in (0..N).rev() {
            let mut sum = y[i];
            for j in (i + 1)..N {
                sum -= self.lu[i][j] * x[j];
            }
            x[i] = sum / self.lu[i][i];
        }
        x
    }

    /// A⁻¹, one column at a time
    pub fn inverse(&self) -> SquareMatrix<N> {
        let mut inv = [[0.0; N]; N];
        for j in 0..N {
            let mut unit = [0.0; N];
            unit[j] = 1.0;
            let column = self.solve(&unit);
            for i in 0..N {
                inv[i][j] = column[i];
            }
        }
        inv
    }
}

/// Matrix inversion through LU decomposition
///
/// Returns false if matrix is singular; `inv` is left untouched then.
pub fn invert<const N: usize>(a: &SquareMatrix<N>, inv: &mut SquareMatrix<N>) -> bool {
    let Some(lu) = lu_decompose(a) else {
        return false;
    };

    let inverse = lu.inverse();
    if !is_finite(&inverse) {
        return false;
    }
    *inv = inverse;
    true
}

/// Serde support for fixed-size vectors and matrices of any dimension
///
/// serde only implements its traits for arrays up to a fixed length, not
/// for `[T; N]` with a generic `N`, so these are used via `#[serde(with)]`.
#[cfg(feature = "serde")]
pub(crate) mod serde_fixed {
    use core::{fmt, marker::PhantomData};

    use serde::{
        de::{self, SeqAccess, Visitor},
        ser::SerializeTuple,
        Deserialize, Deserializer, Serialize, Serializer,
    };

    use super::{SquareMatrix, Vector};

    struct VectorVisitor<const N: usize>;

    impl<'de, const N: usize> Visitor<'de> for VectorVisitor<N> {
        type Value = Vector<N>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "an array of {} numbers", N)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut out = [0.0; N];
            for (i, slot) in out.iter_mut().enumerate() {
                *slot = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(i, &self))?;
            }
            Ok(out)
        }
    }

    struct RowRef<'a, const N: usize>(&'a Vector<N>);

    impl<const N: usize> Serialize for RowRef<'_, N> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            vector::serialize(self.0, serializer)
        }
    }

    struct Row<const N: usize>(Vector<N>);

    impl<'de, const N: usize> Deserialize<'de> for Row<N> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            vector::deserialize(deserializer).map(Row)
        }
    }

    struct MatrixVisitor<const N: usize>(PhantomData<SquareMatrix<N>>);

    impl<'de, const N: usize> Visitor<'de> for MatrixVisitor<N> {
        type Value = SquareMatrix<N>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a {}x{} matrix", N, N)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut out = [[0.0; N]; N];
            for (i, slot) in out.iter_mut().enumerate() {
                let row: Row<N> = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(i, &self))?;
                *slot = row.0;
            }
            Ok(out)
        }
    }

    pub mod vector {
        use super::*;

        pub fn serialize<S: Serializer, const N: usize>(
            value: &Vector<N>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            let mut tuple = serializer.serialize_tuple(N)?;
            for element in value {
                tuple.serialize_element(element)?;
            }
            tuple.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
            deserializer: D,
        ) -> Result<Vector<N>, D::Error> {
            deserializer.deserialize_tuple(N, VectorVisitor::<N>)
        }
    }

    pub mod matrix {
        use super::*;

        pub fn serialize<S: Serializer, const N: usize>(
            value: &SquareMatrix<N>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            let mut tuple = serializer.serialize_tuple(N)?;
            for row in value {
                tuple.serialize_element(&RowRef(row))?;
            }
            tuple.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
            deserializer: D,
        ) -> Result<SquareMatrix<N>, D::Error> {
            deserializer.deserialize_tuple(N, MatrixVisitor::<N>(PhantomData))
        }
    }
}
